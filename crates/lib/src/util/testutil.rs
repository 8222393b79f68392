//! Test utilities for crystal-lib.
//!
//! Helpers for tests that need a pack on disk or a packwiz executable without
//! depending on the real tool.

use std::path::{Path, PathBuf};

use crate::pack::{Pack, PackConfig, Resource, ResourceType, VariantConfig};

/// Name of the file the fake packwiz appends its arguments to, relative to the
/// directory it is run from.
pub const CALL_LOG: &str = "calls.log";

/// Any invocation whose arguments contain this marker exits with status 1.
pub const FAIL_MARKER: &str = "fail-me";

/// Write a stand-in packwiz script into `dir` and return its path.
///
/// The script appends its arguments as one line to [`CALL_LOG`] in its working
/// directory, fails on [`FAIL_MARKER`], and touches the `-o` path of
/// `<format> export -o <path>` invocations.
#[cfg(unix)]
pub fn fake_packwiz(dir: &Path) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let script = format!(
    r#"#!/bin/sh
printf '%s\n' "$*" >> {log}
case "$*" in
  *{fail}*) echo "simulated packwiz failure" >&2; exit 1 ;;
esac
if [ "$2" = "export" ] && [ "$3" = "-o" ]; then
  : > "$4"
fi
exit 0
"#,
    log = CALL_LOG,
    fail = FAIL_MARKER,
  );

  let path = dir.join("packwiz");
  std::fs::write(&path, script).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Lines logged by the fake packwiz in `dir`, empty if it never ran there.
pub fn read_calls(dir: &Path) -> Vec<String> {
  std::fs::read_to_string(dir.join(CALL_LOG))
    .map(|log| log.lines().map(str::to_string).collect())
    .unwrap_or_default()
}

/// A two-variant pack: `main` holds a URL resource A, `extra` inherits `main`,
/// adds a Modrinth mod B and overrides A under a new name.
pub fn scenario_pack() -> Pack {
  let mut pack = Pack::new(PackConfig {
    name: "Crystal".to_string(),
    description: "test pack".to_string(),
    author: "tester".to_string(),
    targets: vec!["1.20".to_string()],
    ..Default::default()
  })
  .unwrap();

  pack
    .add_variant(
      VariantConfig {
        name: "Main".to_string(),
        slug: Some("main".to_string()),
        resources: vec![Resource::url("A", "https://example.com/a.jar", ResourceType::Mod)],
        ..Default::default()
      },
      true,
    )
    .unwrap();

  pack
    .add_variant(
      VariantConfig {
        name: "Extra".to_string(),
        slug: Some("extra".to_string()),
        inherits: Some("main".to_string()),
        resources: vec![
          Resource::modrinth("B", "bbbb", ResourceType::Mod),
          Resource::url("A (patched)", "https://example.com/a.jar", ResourceType::Mod),
        ],
      },
      false,
    )
    .unwrap();

  pack
}

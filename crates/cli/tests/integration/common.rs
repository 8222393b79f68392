//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary pack directory and a stand-in packwiz that
/// records its arguments to `calls.log` in the directory it runs in.
pub struct TestEnv {
  pub temp: TempDir,
  pub pack_dir: PathBuf,
  pub packwiz: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let pack_dir = temp.path().join("pack");
    std::fs::create_dir_all(&pack_dir).unwrap();
    let pack_dir = dunce::canonicalize(&pack_dir).unwrap_or(pack_dir);
    let packwiz = write_fake_packwiz(temp.path());
    Self { temp, pack_dir, packwiz }
  }

  /// Get a pre-configured Command for the crystal binary.
  ///
  /// Sets `CRYSTAL_PACK_DIR` and `CRYSTAL_PACKWIZ` to the isolated paths.
  pub fn crystal_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("crystal");
    cmd.env_remove("RUST_LOG");
    cmd.env("CRYSTAL_PACK_DIR", &self.pack_dir);
    cmd.env("CRYSTAL_PACKWIZ", &self.packwiz);
    cmd
  }

  /// Run a crystal command that must succeed.
  pub fn run(&self, args: &[&str]) {
    self.crystal_cmd().args(args).assert().success();
  }

  pub fn bin_dir(&self, target: &str, variant: &str) -> PathBuf {
    self.pack_dir.join("bin").join(target).join(variant)
  }

  pub fn exports_dir(&self, target: &str, variant: &str) -> PathBuf {
    self.pack_dir.join("exports").join(target).join(variant)
  }
}

/// Lines logged by the fake packwiz in `dir`.
pub fn calls(dir: &Path) -> Vec<String> {
  std::fs::read_to_string(dir.join("calls.log"))
    .map(|log| log.lines().map(str::to_string).collect())
    .unwrap_or_default()
}

#[cfg(unix)]
fn write_fake_packwiz(dir: &Path) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let script = r#"#!/bin/sh
printf '%s\n' "$*" >> calls.log
case "$*" in
  *fail-me*) echo "simulated packwiz failure" >&2; exit 1 ;;
esac
if [ "$2" = "export" ] && [ "$3" = "-o" ]; then
  : > "$4"
fi
exit 0
"#;
  let path = dir.join("packwiz");
  std::fs::write(&path, script).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

#[cfg(not(unix))]
fn write_fake_packwiz(dir: &Path) -> PathBuf {
  dir.join("packwiz")
}

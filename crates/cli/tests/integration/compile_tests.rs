//! End-to-end compile and export through the CLI with a fake packwiz.

use predicates::prelude::*;
use serial_test::serial;

use crate::common::{TestEnv, calls};

fn scenario() -> TestEnv {
  let env = TestEnv::new();
  env.run(&["init", "--name", "Crystal", "--author", "tester", "--target", "1.20"]);
  env.run(&["add", "url", "A", "https://example.com/a.jar"]);
  env.run(&["variant", "add", "Extra", "--inherits", "main"]);
  env.run(&["add", "modrinth", "bbbb", "--name", "B", "--variant", "extra"]);
  env.run(&["add", "url", "A (patched)", "https://example.com/a.jar", "--variant", "extra"]);
  env
}

#[test]
#[serial]
fn compile_runs_packwiz_per_pair() {
  let env = scenario();

  env
    .crystal_cmd()
    .arg("compile")
    .assert()
    .success()
    .stdout(predicate::str::contains("Compiled 2 pack(s)"));

  assert_eq!(
    calls(&env.bin_dir("1.20", "main")),
    vec![
      "init --author tester --mc-version 1.20 --fabric-latest --name Crystal --version 1.0.0 -r --modloader fabric -y",
      "url add A https://example.com/a.jar --meta-folder mods",
      "refresh",
    ]
  );

  let extra = calls(&env.bin_dir("1.20", "extra"));
  assert_eq!(extra.len(), 4);
  assert!(extra[0].contains("--name Crystal [Extra]"));
  assert_eq!(extra[1], "modrinth add bbbb --meta-folder mods");
  assert_eq!(extra[2], "url add A (patched) https://example.com/a.jar --meta-folder mods");
  assert_eq!(extra[3], "refresh");
}

#[test]
#[serial]
fn compile_single_pair_clears_previous_output() {
  let env = scenario();
  env.run(&["compile"]);

  env.run(&["compile", "1.20", "extra"]);

  assert!(!env.bin_dir("1.20", "main").exists());
  assert_eq!(calls(&env.bin_dir("1.20", "extra")).len(), 4);
}

#[test]
#[serial]
fn compile_through_shell_preserves_arguments() {
  let env = scenario();

  env.run(&["--shell", "/bin/sh", "compile", "1.20", "extra"]);

  assert_eq!(
    calls(&env.bin_dir("1.20", "extra"))[2],
    "url add A (patched) https://example.com/a.jar --meta-folder mods"
  );
}

#[test]
#[serial]
fn failing_step_fails_the_command() {
  let env = scenario();
  env.run(&["add", "modrinth", "fail-me", "--variant", "extra"]);

  env
    .crystal_cmd()
    .args(["compile", "1.20", "extra"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("pipeline for variant 'extra' on target '1.20' failed"));

  let extra = calls(&env.bin_dir("1.20", "extra"));
  assert_eq!(extra.last().map(String::as_str), Some("modrinth add fail-me --meta-folder mods"));
}

#[test]
#[serial]
fn export_after_compile_writes_artifacts() {
  let env = scenario();
  env.run(&["target", "add", "1.21"]);
  env.run(&["compile"]);

  env
    .crystal_cmd()
    .arg("export")
    .assert()
    .success()
    .stdout(predicate::str::contains("Exported 4 pack(s)"));

  for target in ["1.20", "1.21"] {
    for variant in ["main", "extra"] {
      let dir = env.exports_dir(target, variant);
      assert!(dir.join(format!("crystal-{}.mrpack", variant)).exists());
      assert!(dir.join(format!("crystal-{}.zip", variant)).exists());
    }
  }
}

#[test]
#[serial]
fn packwiz_from_manifest_is_used() {
  let env = scenario();
  let mut manifest: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(env.pack_dir.join("pack.json")).unwrap()).unwrap();
  manifest["packwiz"] = serde_json::Value::String(env.packwiz.to_string_lossy().into_owned());
  std::fs::write(env.pack_dir.join("pack.json"), manifest.to_string()).unwrap();

  env
    .crystal_cmd()
    .env_remove("CRYSTAL_PACKWIZ")
    .args(["compile", "1.20", "main"])
    .assert()
    .success();

  assert_eq!(calls(&env.bin_dir("1.20", "main")).len(), 3);
}

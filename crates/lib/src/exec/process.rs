//! Process launcher.
//!
//! Spawns one external process, waits for it to exit and reports an
//! [`ExecResult`]. Whether a non-zero exit settles as an error is decided by
//! [`ExecConfig::reject_if_nonzero`].

use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::consts::SIGNAL_EXIT_CODE;

use super::invocation::Invocation;
use super::types::{ExecConfig, ExecError, ExecResult};

/// Run an invocation.
///
/// The program is spawned directly with its argument vector, unless
/// `config.shell` is set, in which case the quoted command line is handed to
/// that shell. Only POSIX shells are accepted there.
pub async fn exec(invocation: &Invocation, config: &ExecConfig) -> Result<ExecResult, ExecError> {
  let command_line = invocation.to_command_line();

  let command = match config.shell.as_deref() {
    Some(shell) if !is_posix_shell(shell) => return Err(ExecError::UnsupportedShell(shell.to_string())),
    Some(shell) => shell_command(Some(shell), &command_line),
    None => {
      let mut command = Command::new(&invocation.program);
      command.args(&invocation.args);
      command
    }
  };

  run(command, command_line, config).await
}

/// Run a raw command string through a shell.
///
/// Uses `config.shell`, or the platform default (`/bin/sh -c` on Unix,
/// `cmd.exe /C` on Windows).
pub async fn exec_shell(cmd: &str, config: &ExecConfig) -> Result<ExecResult, ExecError> {
  let command = shell_command(config.shell.as_deref(), cmd);
  run(command, cmd.to_string(), config).await
}

async fn run(mut command: Command, command_line: String, config: &ExecConfig) -> Result<ExecResult, ExecError> {
  info!(cmd = %command_line, cwd = ?config.cwd, "executing command");

  command
    .current_dir(&config.cwd)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

  let result = match command.output().await {
    Ok(output) => {
      let stderr = String::from_utf8_lossy(&output.stderr);
      let stdout = String::from_utf8_lossy(&output.stdout);
      let result = result_from_status(output.status);

      if !stdout.trim().is_empty() {
        debug!(stdout = %stdout.trim(), "command stdout");
      }
      if !stderr.trim().is_empty() {
        if result.is_success() {
          debug!(stderr = %stderr.trim(), "command stderr");
        } else {
          warn!(cmd = %command_line, stderr = %stderr.trim(), "command stderr");
        }
      }

      result
    }
    Err(e) => {
      if config.show_errors {
        warn!(cmd = %command_line, error = %e, "failed to spawn command");
      }
      ExecResult {
        code: SIGNAL_EXIT_CODE,
        signal: None,
        errors: vec![e.to_string()],
      }
    }
  };

  debug!(cmd = %command_line, code = result.code, signal = ?result.signal, "command exited");

  if config.reject_if_nonzero && !result.is_success() {
    return Err(ExecError::Process {
      command: command_line,
      result,
    });
  }

  Ok(result)
}

fn result_from_status(status: ExitStatus) -> ExecResult {
  ExecResult {
    code: status.code().unwrap_or(SIGNAL_EXIT_CODE),
    signal: exit_signal(&status),
    errors: Vec::new(),
  }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<String> {
  use std::os::unix::process::ExitStatusExt;

  status.signal().map(signal_name)
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<String> {
  None
}

#[cfg(unix)]
fn signal_name(signal: i32) -> String {
  let name = match signal {
    1 => "SIGHUP",
    2 => "SIGINT",
    3 => "SIGQUIT",
    4 => "SIGILL",
    6 => "SIGABRT",
    8 => "SIGFPE",
    9 => "SIGKILL",
    11 => "SIGSEGV",
    13 => "SIGPIPE",
    14 => "SIGALRM",
    15 => "SIGTERM",
    _ => return format!("SIG{}", signal),
  };
  name.to_string()
}

fn shell_command(shell: Option<&str>, cmd: &str) -> Command {
  let (shell_cmd, shell_args) = get_shell(shell);
  let mut command = Command::new(shell_cmd);
  command.args(shell_args).arg(cmd);
  command
}

fn is_powershell(shell: &str) -> bool {
  shell.contains("powershell") || shell.contains("pwsh")
}

fn is_cmd(shell: &str) -> bool {
  shell.contains("cmd")
}

fn is_posix_shell(shell: &str) -> bool {
  !is_powershell(shell) && !is_cmd(shell)
}

/// Get the shell command and arguments for the current platform.
///
/// An explicit shell gets the argument style its name suggests; otherwise
/// `/bin/sh` (Unix) or `cmd.exe` (Windows) is used rather than `$SHELL`, which
/// may source user profiles.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if is_powershell(shell) {
      vec!["-NoProfile".to_string(), "-Command".to_string()]
    } else if is_cmd(shell) {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    ("cmd.exe".to_string(), vec!["/C".to_string()])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn config(dir: &TempDir, reject: bool) -> ExecConfig {
    ExecConfig {
      cwd: dir.path().to_path_buf(),
      reject_if_nonzero: reject,
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn exec_shell_reports_zero_exit() {
    let temp_dir = TempDir::new().unwrap();

    let result = exec_shell("exit 0", &config(&temp_dir, true)).await.unwrap();

    assert_eq!(result.code, 0);
    assert!(result.signal.is_none());
    assert!(result.errors.is_empty());
  }

  #[tokio::test]
  async fn nonzero_exit_resolves_when_not_rejecting() {
    let temp_dir = TempDir::new().unwrap();

    let result = exec_shell("exit 3", &config(&temp_dir, false)).await.unwrap();

    assert_eq!(result.code, 3);
    assert!(!result.is_success());
  }

  #[tokio::test]
  async fn nonzero_exit_rejects_when_requested() {
    let temp_dir = TempDir::new().unwrap();

    let err = exec_shell("exit 7", &config(&temp_dir, true)).await.unwrap_err();

    match err {
      ExecError::Process { command, result } => {
        assert_eq!(command, "exit 7");
        assert_eq!(result.code, 7);
      }
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn exec_runs_in_configured_cwd() {
    let temp_dir = TempDir::new().unwrap();
    let sub_dir = temp_dir.path().join("subdir");
    tokio::fs::create_dir(&sub_dir).await.unwrap();

    let config = ExecConfig::strict(&sub_dir);
    exec(&Invocation::new("/usr/bin/touch").arg("cwd_marker"), &config)
      .await
      .unwrap();

    assert!(sub_dir.join("cwd_marker").exists());
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn exec_passes_arguments_verbatim() {
    let temp_dir = TempDir::new().unwrap();

    let invocation = Invocation::new("/bin/sh").args(["-c", "printf '%s' \"$1\" > out.txt", "sh", "a $b \"c\""]);
    exec(&invocation, &config(&temp_dir, true)).await.unwrap();

    let written = std::fs::read_to_string(temp_dir.path().join("out.txt")).unwrap();
    assert_eq!(written, "a $b \"c\"");
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn exec_through_shell_keeps_arguments_intact() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir, true).with_shell(Some("/bin/sh".to_string()));

    let invocation = Invocation::new("/usr/bin/touch").arg("with space $HOME.txt");
    exec(&invocation, &config).await.unwrap();

    assert!(temp_dir.path().join("with space $HOME.txt").exists());
  }

  #[tokio::test]
  async fn spawn_failure_is_recorded() {
    let temp_dir = TempDir::new().unwrap();

    let result = exec(&Invocation::new("/definitely/not/a/program"), &config(&temp_dir, false))
      .await
      .unwrap();

    assert_eq!(result.code, SIGNAL_EXIT_CODE);
    assert_eq!(result.errors.len(), 1);

    let err = exec(&Invocation::new("/definitely/not/a/program"), &config(&temp_dir, true))
      .await
      .unwrap_err();
    assert_eq!(err.result().map(|r| r.errors.len()), Some(1));
  }

  #[tokio::test]
  #[traced_test]
  async fn spawn_failure_warning_follows_show_errors() {
    let temp_dir = TempDir::new().unwrap();
    let quiet = ExecConfig {
      show_errors: false,
      ..config(&temp_dir, false)
    };

    let result = exec(&Invocation::new("/definitely/not/a/program"), &quiet)
      .await
      .unwrap();
    assert_eq!(result.errors.len(), 1);
    assert!(!logs_contain("failed to spawn command"));

    exec(&Invocation::new("/definitely/not/a/program"), &config(&temp_dir, false))
      .await
      .unwrap();
    assert!(logs_contain("failed to spawn command"));
  }

  #[tokio::test]
  async fn exec_refuses_non_posix_shells() {
    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("ran");

    for shell in ["cmd.exe", "pwsh", "powershell.exe"] {
      let config = config(&temp_dir, true).with_shell(Some(shell.to_string()));
      let invocation = Invocation::new("touch").arg(marker.to_string_lossy().to_string());

      let err = exec(&invocation, &config).await.unwrap_err();
      assert!(matches!(err, ExecError::UnsupportedShell(ref s) if s == shell), "{err:?}");
    }
    assert!(!marker.exists());
    assert!(is_posix_shell("/bin/bash"));
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn signal_termination_is_reported() {
    let temp_dir = TempDir::new().unwrap();

    let result = exec_shell("kill -9 $$", &config(&temp_dir, false)).await.unwrap();

    assert_eq!(result.code, SIGNAL_EXIT_CODE);
    assert_eq!(result.signal.as_deref(), Some("SIGKILL"));
  }

  #[test]
  fn get_shell_with_override() {
    let (shell, args) = get_shell(Some("/usr/bin/bash"));
    assert_eq!(shell, "/usr/bin/bash");
    assert_eq!(args, vec!["-c"]);
  }

  #[test]
  fn get_shell_with_powershell_override() {
    let (shell, args) = get_shell(Some("pwsh"));
    assert_eq!(shell, "pwsh");
    assert_eq!(args, vec!["-NoProfile", "-Command"]);
  }

  #[test]
  fn get_shell_with_cmd_override() {
    let (shell, args) = get_shell(Some("cmd.exe"));
    assert_eq!(shell, "cmd.exe");
    assert_eq!(args, vec!["/C"]);
  }

  #[test]
  #[cfg(unix)]
  fn get_shell_default() {
    let (shell, args) = get_shell(None);
    assert_eq!(shell, "/bin/sh");
    assert_eq!(args, vec!["-c"]);
  }

  #[test]
  #[cfg(unix)]
  fn signal_names() {
    assert_eq!(signal_name(9), "SIGKILL");
    assert_eq!(signal_name(15), "SIGTERM");
    assert_eq!(signal_name(42), "SIG42");
  }
}

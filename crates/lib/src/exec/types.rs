//! Types for process execution.
//!
//! This module defines the configuration, result and error types shared by
//! the process launcher and the combinators.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration for launching one process.
///
/// Passed explicitly to every launch; nothing is read from ambient process
/// state except what the caller puts here.
#[derive(Debug, Clone)]
pub struct ExecConfig {
  /// Working directory of the child.
  pub cwd: PathBuf,

  /// Shell used to run the command line. `None` spawns the program directly
  /// (for [`super::exec`]) or uses the platform shell (for [`super::exec_shell`]).
  ///
  /// [`super::exec`] quotes arguments for a POSIX shell and refuses `cmd`
  /// and PowerShell; [`super::exec_shell`] passes its string through as is.
  pub shell: Option<String>,

  /// Settle as failure on a non-zero exit, a signal, or a spawn error.
  pub reject_if_nonzero: bool,

  /// Also log spawn-time errors as warnings.
  pub show_errors: bool,
}

impl Default for ExecConfig {
  fn default() -> Self {
    Self {
      cwd: PathBuf::from("."),
      shell: None,
      reject_if_nonzero: false,
      show_errors: true,
    }
  }
}

impl ExecConfig {
  /// Config that rejects on any unsuccessful exit, running in `cwd`.
  pub fn strict(cwd: impl Into<PathBuf>) -> Self {
    Self {
      cwd: cwd.into(),
      reject_if_nonzero: true,
      ..Default::default()
    }
  }

  pub fn with_shell(mut self, shell: Option<String>) -> Self {
    self.shell = shell;
    self
  }
}

/// The outcome of one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
  /// Exit code, or [`crate::consts::SIGNAL_EXIT_CODE`] if the process was
  /// killed by a signal or never started.
  pub code: i32,

  /// Name of the terminating signal, if any.
  pub signal: Option<String>,

  /// Errors observed while spawning or waiting on the process.
  pub errors: Vec<String>,
}

impl ExecResult {
  pub fn is_success(&self) -> bool {
    self.code == 0 && self.signal.is_none() && self.errors.is_empty()
  }
}

impl fmt::Display for ExecResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.signal {
      Some(signal) => write!(f, "terminated by {}", signal)?,
      None => write!(f, "exit code {}", self.code)?,
    }
    if !self.errors.is_empty() {
      write!(f, " ({})", self.errors.join("; "))?;
    }
    Ok(())
  }
}

/// Errors that can occur while executing processes.
#[derive(Debug, Error)]
pub enum ExecError {
  /// The process did not exit successfully and the policy demanded rejection.
  #[error("command failed with {result}: {command}")]
  Process { command: String, result: ExecResult },

  /// An invocation was routed through a shell whose quoting rules differ
  /// from POSIX `sh`.
  #[error("shell '{0}' is not a POSIX shell; invocations can only run through sh-compatible shells")]
  UnsupportedShell(String),

  /// A concurrently launched operation panicked or was aborted.
  #[error("task failed: {0}")]
  Join(String),

  /// I/O error while preparing an execution.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl ExecError {
  /// The process result carried by a [`ExecError::Process`].
  pub fn result(&self) -> Option<&ExecResult> {
    match self {
      ExecError::Process { result, .. } => Some(result),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exec_config_defaults() {
    let config = ExecConfig::default();
    assert!(!config.reject_if_nonzero);
    assert!(config.show_errors);
    assert!(config.shell.is_none());

    let strict = ExecConfig::strict("/tmp/work");
    assert!(strict.reject_if_nonzero);
    assert_eq!(strict.cwd, PathBuf::from("/tmp/work"));
  }

  #[test]
  fn result_success_requires_clean_exit() {
    let ok = ExecResult {
      code: 0,
      signal: None,
      errors: vec![],
    };
    assert!(ok.is_success());

    let signalled = ExecResult {
      code: -1,
      signal: Some("SIGKILL".to_string()),
      errors: vec![],
    };
    assert!(!signalled.is_success());
  }

  #[test]
  fn process_error_display() {
    let err = ExecError::Process {
      command: "packwiz refresh".to_string(),
      result: ExecResult {
        code: 2,
        signal: None,
        errors: vec![],
      },
    };
    assert_eq!(err.to_string(), "command failed with exit code 2: packwiz refresh");
    assert_eq!(err.result().map(|r| r.code), Some(2));

    let err = ExecError::Process {
      command: "sleep 10".to_string(),
      result: ExecResult {
        code: -1,
        signal: Some("SIGTERM".to_string()),
        errors: vec!["boom".to_string()],
      },
    };
    assert_eq!(err.to_string(), "command failed with terminated by SIGTERM (boom): sleep 10");
  }
}

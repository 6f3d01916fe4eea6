//! Command execution types

use std::time::Duration;

use thiserror::Error;

/// Failure that prevented a command from producing an exit status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("failed to spawn shell: {0}")]
    Spawn(String),

    #[error("failed to wait for process: {0}")]
    Wait(String),

    #[error("command timed out after {0:?}")]
    TimedOut(Duration),
}

/// Outcome of a single command run
///
/// Exactly one of `exit_code` and `process_error` is set.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub ok: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub process_error: Option<ProcessError>,
    pub command: String,
}

impl CommandResult {
    /// The process ran and terminated with `exit_code`
    pub fn exited(command: &str, exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            ok: exit_code == 0,
            exit_code: Some(exit_code),
            stdout,
            stderr,
            process_error: None,
            command: command.to_string(),
        }
    }

    /// The process never produced an exit status
    pub fn failed(command: &str, error: ProcessError, stdout: String, stderr: String) -> Self {
        Self {
            ok: false,
            exit_code: None,
            stdout,
            stderr,
            process_error: Some(error),
            command: command.to_string(),
        }
    }
}

//! Shell command runner

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::types::{CommandResult, ProcessError};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Runs a shell command to completion
///
/// Implementations never fail: every outcome is reported through the
/// returned [`CommandResult`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, command: &str) -> CommandResult;
}

/// Growing byte buffer for one output stream
#[derive(Debug, Default)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
}

impl OutputBuffer {
    /// Read `pipe` until EOF, appending everything in arrival order.
    ///
    /// Bytes read before a read error are kept.
    pub async fn drain<R>(&mut self, pipe: Option<&mut R>)
    where
        R: AsyncRead + Unpin,
    {
        let Some(pipe) = pipe else {
            return;
        };

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match pipe.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => self.bytes.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("Stopped reading output stream: {}", e);
                    break;
                }
            }
        }
    }

    /// Decode the collected bytes, replacing invalid UTF-8
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// How a spawned child finished
enum Termination {
    Exited(i32),
    Failed(ProcessError),
}

impl Termination {
    fn from_wait(status: io::Result<ExitStatus>) -> Self {
        match status {
            Ok(status) => Termination::Exited(exit_code(status)),
            Err(e) => Termination::Failed(ProcessError::Wait(e.to_string())),
        }
    }
}

/// Runs commands as `<shell> -c <command>`
pub struct ShellRunner {
    shell: String,
    deadline: Option<Duration>,
}

impl ShellRunner {
    /// Create a new runner
    pub fn new(shell: impl Into<String>, deadline: Option<Duration>) -> Self {
        Self {
            shell: shell.into(),
            deadline,
        }
    }

    /// Create a runner from the agent configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.shell.clone(), config.command_deadline())
    }

    async fn execute(&self, command: &str) -> CommandResult {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a deadline kill also reaches grandchildren
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn {}: {}", self.shell, e);
                return CommandResult::failed(
                    command,
                    ProcessError::Spawn(e.to_string()),
                    String::new(),
                    String::new(),
                );
            }
        };

        let process_group = child.id();
        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let mut stdout = OutputBuffer::default();
        let mut stderr = OutputBuffer::default();

        // Completes once the child exited and both streams reached EOF
        let finished = async {
            let (status, (), ()) = tokio::join!(
                child.wait(),
                stdout.drain(stdout_pipe.as_mut()),
                stderr.drain(stderr_pipe.as_mut()),
            );
            Termination::from_wait(status)
        };

        // Exactly one of exit and deadline settles the run
        let settled = match self.deadline {
            Some(limit) => tokio::time::timeout(limit, finished).await.ok(),
            None => Some(finished.await),
        };

        let termination = match (settled, self.deadline) {
            (Some(termination), _) => termination,
            (None, limit) => {
                let limit = limit.unwrap_or_default();
                warn!("Command exceeded deadline of {:?}, killing it", limit);
                kill_process_group(&mut child, process_group).await;
                Termination::Failed(ProcessError::TimedOut(limit))
            }
        };

        let stdout = stdout.into_string();
        let stderr = stderr.into_string();

        match termination {
            Termination::Exited(code) => CommandResult::exited(command, code, stdout, stderr),
            Termination::Failed(error) => CommandResult::failed(command, error, stdout, stderr),
        }
    }
}

#[async_trait]
impl CommandExecutor for ShellRunner {
    async fn run(&self, command: &str) -> CommandResult {
        let span = info_span!("command", run_id = %Uuid::new_v4());

        async {
            info!("Running command: {}", command);
            let result = self.execute(command).await;

            match (&result.exit_code, &result.process_error) {
                (Some(code), _) => info!(
                    exit_code = code,
                    stdout_len = result.stdout.len(),
                    stderr_len = result.stderr.len(),
                    "Command finished"
                ),
                (None, Some(error)) => warn!("Command did not complete: {}", error),
                (None, None) => {}
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Exit code of a terminated child; a signal death maps to `128 + signal`
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

/// Kill the child and everything it started, then reap it
///
/// `process_group` is captured at spawn time; the child may already be
/// reaped while a grandchild still holds the output pipes.
async fn kill_process_group(child: &mut Child, process_group: Option<u32>) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = process_group.and_then(|pid| i32::try_from(pid).ok()) {
            if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
                debug!("killpg({}) failed: {}", pid, e);
            }
        }
    }

    if let Err(e) = child.kill().await {
        debug!("Failed to kill child: {}", e);
    }
}

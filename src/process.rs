//! Helpers for running child processes with timeouts.

use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::{Result, TaggerError};

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub command: String,
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }

    /// Turn a non-zero exit into `CommandFailed`.
    pub fn into_checked(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        Err(TaggerError::CommandFailed {
            exit_code: self.status.code(),
            stderr: self.stderr_str(),
            command: self.command,
        })
    }
}

/// Render a command the way an operator would type it.
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Build a command rooted in `dir`.
pub fn command_in(program: &str, dir: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.current_dir(dir);
    cmd
}

/// Run a command with a timeout, capturing stdout and stderr.
///
/// Output is drained on reader threads while the child runs so a chatty
/// process cannot block on a full pipe. A non-zero exit is returned as-is;
/// use [`run_checked`] when it should be an error. Exceeding `timeout`
/// kills the child and fails with `Timeout`. The deadline also covers
/// draining output, since a grandchild can hold the pipes open after the
/// child itself has exited.
pub fn run_command(mut cmd: Command, timeout: Duration) -> Result<CommandOutput> {
    let command = describe(&cmd);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(command = %command, timeout_secs = timeout.as_secs(), "spawning child process");
    let deadline = Instant::now() + timeout;
    let mut child = cmd.spawn().map_err(|e| TaggerError::CommandFailed {
        command: command.clone(),
        exit_code: None,
        stderr: format!("failed to spawn: {}", e),
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_rx = spawn_reader(stdout);
    let stderr_rx = spawn_reader(stderr);

    let status = match child.wait_timeout(timeout)? {
        Some(status) => status,
        None => {
            warn!(
                command = %command,
                timeout_secs = timeout.as_secs(),
                "command timed out, killing"
            );
            child.kill()?;
            child.wait()?;
            return Err(TaggerError::Timeout {
                command,
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    let (Some(stdout), Some(stderr)) = (
        collect_until(&stdout_rx, deadline),
        collect_until(&stderr_rx, deadline),
    ) else {
        warn!(command = %command, "child exited but its output pipes stayed open");
        return Err(TaggerError::Timeout {
            command,
            timeout_secs: timeout.as_secs(),
        });
    };

    debug!(command = %command, exit_code = ?status.code(), "command finished");
    Ok(CommandOutput {
        command,
        status,
        stdout,
        stderr,
    })
}

/// Run a command and fail with `CommandFailed` on non-zero exit.
pub fn run_checked(cmd: Command, timeout: Duration) -> Result<CommandOutput> {
    run_command(cmd, timeout)?.into_checked()
}

fn spawn_reader<R: Read + Send + 'static>(stream: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(read_stream(stream));
    });
    rx
}

fn collect_until(rx: &Receiver<Vec<u8>>, deadline: Instant) -> Option<Vec<u8>> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    rx.recv_timeout(remaining).ok()
}

fn read_stream<R: Read>(stream: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        if let Err(e) = stream.read_to_end(&mut buf) {
            warn!(err = %e, "failed to read child output");
        }
    }
    buf
}

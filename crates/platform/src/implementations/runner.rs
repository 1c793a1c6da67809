//! Shell command execution
//!
//! Output lines are read on dedicated tasks and forwarded through a channel,
//! so a slow consumer of one stream never stalls the other and cancellation
//! can interrupt the wait at any point.

use async_trait::async_trait;
use pyembed_errors::PlatformError;
use pyembed_events::{AppEvent, EventEmitter, OutputStream, ProcessEvent};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::PlatformContext;
use crate::process::{CommandOutcome, ProcessOperations, ShellInvoker};

/// Runs command lines through a [`ShellInvoker`]
pub struct ShellProcessOperations {
    shell: Box<dyn ShellInvoker>,
}

impl ShellProcessOperations {
    #[must_use]
    pub fn new(shell: Box<dyn ShellInvoker>) -> Self {
        Self { shell }
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn spawn_error(shell: &str, command_line: &str, err: &std::io::Error) -> PlatformError {
    if err.kind() == std::io::ErrorKind::NotFound {
        PlatformError::CommandNotFound {
            command: shell.to_string(),
        }
    } else {
        PlatformError::ProcessExecutionFailed {
            command: command_line.to_string(),
            message: err.to_string(),
        }
    }
}

/// Read `reader` line by line until EOF. Invalid UTF-8 is replaced rather
/// than ending the stream, so the child is never left writing to a closed pipe.
fn pump<R>(
    reader: R,
    stream: OutputStream,
    tx: mpsc::UnboundedSender<(OutputStream, String)>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    while matches!(buf.last(), Some(b'\n' | b'\r')) {
                        buf.pop();
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send((stream, line)).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

enum Step {
    Line(OutputStream, String),
    StreamsClosed,
    Cancelled,
}

#[async_trait]
impl ProcessOperations for ShellProcessOperations {
    async fn run_shell(
        &self,
        ctx: &PlatformContext,
        command_line: &str,
        cwd: Option<&Path>,
        cancel: &CancellationToken,
    ) -> CommandOutcome {
        let start = Instant::now();
        let mut cmd = self.shell.wrap(command_line);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        ctx.emit(AppEvent::Process(ProcessEvent::Started {
            command: command_line.to_string(),
            shell: self.shell.name().to_string(),
            cwd: cwd.map(|dir| dir.display().to_string()),
        }));

        if cancel.is_cancelled() {
            ctx.emit(AppEvent::Process(ProcessEvent::Cancelled {
                command: command_line.to_string(),
            }));
            return CommandOutcome::Cancelled;
        }

        let mut command = cmd.to_tokio();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                let message = spawn_error(self.shell.name(), command_line, &e).to_string();
                ctx.emit(AppEvent::Process(ProcessEvent::Failed {
                    command: command_line.to_string(),
                    message: message.clone(),
                }));
                return CommandOutcome::SpawnFailed { message };
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(pump(stdout, OutputStream::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(pump(stderr, OutputStream::Stderr, tx.clone()));
        }
        drop(tx);

        let cancelled = loop {
            let step = tokio::select! {
                biased;
                () = cancel.cancelled() => Step::Cancelled,
                msg = rx.recv() => match msg {
                    Some((stream, line)) => Step::Line(stream, line),
                    None => Step::StreamsClosed,
                },
            };
            match step {
                Step::Line(stream, line) => {
                    ctx.emit(AppEvent::Process(ProcessEvent::Output { stream, line }));
                }
                Step::StreamsClosed => break false,
                Step::Cancelled => break true,
            }
        };

        let status = if cancelled {
            None
        } else {
            tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                status = child.wait() => Some(status),
            }
        };

        let Some(status) = status else {
            // Grandchildren may still hold the pipes open; stop reading them.
            for handle in &pumps {
                handle.abort();
            }
            let _ = child.kill().await;
            ctx.emit(AppEvent::Process(ProcessEvent::Cancelled {
                command: command_line.to_string(),
            }));
            return CommandOutcome::Cancelled;
        };

        match status {
            Ok(status) => {
                let code = status.code();
                ctx.emit(AppEvent::Process(ProcessEvent::Exited {
                    command: command_line.to_string(),
                    exit_code: code,
                    duration_ms: duration_to_millis(start.elapsed()),
                }));
                CommandOutcome::Exited { code }
            }
            Err(e) => {
                let message = PlatformError::ProcessExecutionFailed {
                    command: command_line.to_string(),
                    message: e.to_string(),
                }
                .to_string();
                ctx.emit(AppEvent::Process(ProcessEvent::Failed {
                    command: command_line.to_string(),
                    message: message.clone(),
                }));
                CommandOutcome::SpawnFailed { message }
            }
        }
    }

    fn shell_name(&self) -> &'static str {
        self.shell.name()
    }
}

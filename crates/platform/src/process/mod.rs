//! Process execution operations

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::core::PlatformContext;

/// Platform-specific command builder
#[derive(Debug, Clone)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    raw_tail: Option<String>,
    current_dir: Option<PathBuf>,
}

impl PlatformCommand {
    /// Create a new platform command
    #[must_use]
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            raw_tail: None,
            current_dir: None,
        }
    }

    /// Add an argument to the command
    pub fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Append a final argument that is passed to the program unescaped.
    ///
    /// `cmd.exe` does its own parsing of the command line, so quoting added
    /// by the process spawner would corrupt it. Elsewhere this is a plain
    /// argument.
    pub fn raw_tail<S: Into<String>>(&mut self, tail: S) -> &mut Self {
        self.raw_tail = Some(tail.into());
        self
    }

    /// Set the working directory for the command
    pub fn current_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Get the program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments, not including the raw tail
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn get_raw_tail(&self) -> Option<&str> {
        self.raw_tail.as_deref()
    }

    /// Get the current directory
    #[must_use]
    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }

    /// Build the tokio command that will actually be spawned
    #[must_use]
    pub fn to_tokio(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        if let Some(tail) = &self.raw_tail {
            #[cfg(windows)]
            {
                command.raw_arg(tail);
            }
            #[cfg(not(windows))]
            {
                command.arg(tail);
            }
        }
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

/// Wraps a free-form command line into an invocation of the system shell
pub trait ShellInvoker: Send + Sync {
    /// Shell name used in events (`sh`, `cmd.exe`)
    fn name(&self) -> &'static str;

    /// Build the command that hands `command_line` to the shell verbatim
    fn wrap(&self, command_line: &str) -> PlatformCommand;
}

/// How a shell command ended.
///
/// Running a command never fails with an error: spawn problems and
/// non-zero exits are reported through events and this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The process ran to completion. `code` is `None` when it was
    /// terminated by a signal.
    Exited { code: Option<i32> },
    /// Cancellation was requested and the process was killed
    Cancelled,
    /// The shell could not be started or awaited
    SpawnFailed { message: String },
}

impl CommandOutcome {
    /// Whether the command exited with status zero
    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited { code: Some(0) })
    }

    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exited { code } => *code,
            _ => None,
        }
    }
}

/// Trait for process execution operations
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Run `command_line` through the shell, streaming every output line as
    /// an event the moment it is read.
    async fn run_shell(
        &self,
        ctx: &PlatformContext,
        command_line: &str,
        cwd: Option<&Path>,
        cancel: &CancellationToken,
    ) -> CommandOutcome;

    /// Name of the shell commands run through
    fn shell_name(&self) -> &'static str;
}

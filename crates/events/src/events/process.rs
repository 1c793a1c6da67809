use serde::{Deserialize, Serialize};
use std::fmt;

/// Which standard stream a line of child output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Shell command execution events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessEvent {
    Started {
        command: String,
        shell: String,
        cwd: Option<String>,
    },

    /// One line of output, delivered as soon as it is read
    Output { stream: OutputStream, line: String },

    Exited {
        command: String,
        exit_code: Option<i32>,
        duration_ms: u64,
    },

    /// The child was killed because cancellation was requested
    Cancelled { command: String },

    /// Spawning or awaiting the child failed; the runner swallowed the error
    Failed { command: String, message: String },
}

impl fmt::Display for ProcessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { command, shell, .. } => write!(f, "running `{command}` via {shell}"),
            Self::Output { line, .. } => f.write_str(line),
            Self::Exited {
                command,
                exit_code: Some(0),
                ..
            } => write!(f, "`{command}` completed"),
            Self::Exited {
                command,
                exit_code: Some(code),
                ..
            } => write!(f, "`{command}` exited with code {code}"),
            Self::Exited {
                command,
                exit_code: None,
                ..
            } => write!(f, "`{command}` terminated by signal"),
            Self::Cancelled { command } => write!(f, "`{command}` cancelled"),
            Self::Failed { command, message } => write!(f, "`{command}` failed: {message}"),
        }
    }
}

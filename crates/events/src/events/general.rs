use serde::{Deserialize, Serialize};
use std::fmt;

/// General utility events for warnings, errors, and operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Something failed but the flow continued
    Warning { message: String },

    /// Generic error message with optional details
    Error {
        message: String,
        details: Option<String>,
    },

    DebugLog { message: String },

    /// Generic operation started notification
    OperationStarted { operation: String },

    /// Generic operation completion with success status
    OperationCompleted { operation: String, success: bool },

    /// Generic operation failure with error details
    OperationFailed { operation: String, error: String },
}

impl GeneralEvent {
    /// Create a warning event
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    /// Create an error event
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            details: None,
        }
    }

    /// Create an error event with details
    #[must_use]
    pub fn error_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Create a debug log event
    #[must_use]
    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
        }
    }
}

impl fmt::Display for GeneralEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning { message } => write!(f, "warning: {message}"),
            Self::Error { message, details } => match details {
                Some(details) => write!(f, "error: {message}: {details}"),
                None => write!(f, "error: {message}"),
            },
            Self::DebugLog { message } => f.write_str(message),
            Self::OperationStarted { operation } => write!(f, "{operation} started"),
            Self::OperationCompleted { operation, success } => {
                let state = if *success { "succeeded" } else { "finished with problems" };
                write!(f, "{operation} {state}")
            }
            Self::OperationFailed { operation, error } => write!(f, "{operation} failed: {error}"),
        }
    }
}

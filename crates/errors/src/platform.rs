//! Platform-specific operation errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors that can occur during platform-specific operations
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlatformError {
    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("invalid search path entry: {entry} - {message}")]
    InvalidSearchPath { entry: String, message: String },
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::ProcessExecutionFailed { .. } => "platform.process",
            Self::CommandNotFound { .. } => "platform.command_not_found",
            Self::InvalidSearchPath { .. } => "platform.search_path",
        })
    }
}

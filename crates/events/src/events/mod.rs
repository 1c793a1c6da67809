use serde::{Deserialize, Serialize};
use std::fmt;

use crate::EventSource;
use pyembed_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod download;
pub mod general;
pub mod package;
pub mod process;
pub mod runtime;

pub use download::*;
pub use general::*;
pub use package::*;
pub use process::*;
pub use runtime::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings, errors, debug lines and operation brackets
    General(GeneralEvent),

    /// HTTP transfers
    Download(DownloadEvent),

    /// Shell commands and their output lines
    Process(ProcessEvent),

    /// Runtime setup state machine
    Runtime(RuntimeEvent),

    /// Archive and package-manager installs
    Package(PackageEvent),
}

impl AppEvent {
    /// Identify the source domain for this event.
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Download(_) => EventSource::DOWNLOAD,
            Self::Process(_) => EventSource::PROCESS,
            Self::Runtime(_) => EventSource::RUNTIME,
            Self::Package(_) => EventSource::PACKAGE,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Download(DownloadEvent::Failed { .. })
            | Self::Process(ProcessEvent::Failed { .. })
            | Self::Runtime(RuntimeEvent::StageFailed { .. })
            | Self::Package(PackageEvent::InstallFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Process(ProcessEvent::Cancelled { .. }) => Level::WARN,

            Self::Process(ProcessEvent::Exited {
                exit_code: Some(code),
                ..
            }) if *code != 0 => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Download(DownloadEvent::Progress { .. })
            | Self::Runtime(RuntimeEvent::StageEntered { .. }) => Level::DEBUG,

            Self::Process(ProcessEvent::Output { .. }) => Level::TRACE,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "pyembed::events::general",
            Self::Download(_) => "pyembed::events::download",
            Self::Process(_) => "pyembed::events::process",
            Self::Runtime(_) => "pyembed::events::runtime",
            Self::Package(_) => "pyembed::events::package",
        }
    }
}

/// The free-text log line for an event
impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General(event) => event.fmt(f),
            Self::Download(event) => event.fmt(f),
            Self::Process(event) => event.fmt(f),
            Self::Runtime(event) => event.fmt(f),
            Self::Package(event) => event.fmt(f),
        }
    }
}

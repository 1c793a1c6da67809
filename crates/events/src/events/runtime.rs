use serde::{Deserialize, Serialize};
use std::fmt;

/// Stages of the runtime setup state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStage {
    Absent,
    Acquiring,
    Extracting,
    Patched,
    Failed,
}

impl SetupStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Acquiring => "acquiring",
            Self::Extracting => "extracting",
            Self::Patched => "patched",
            Self::Failed => "failed",
        }
    }
}

/// Runtime provisioning events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    /// Fast path: directory and executable already present
    AlreadyInstalled { home: String },

    StageEntered { stage: SetupStage, home: String },

    ArchiveReady { archive: String, source: String },

    Extracted {
        archive: String,
        home: String,
        skipped: bool,
    },

    RestrictionFileRemoved { path: String },

    Ready { home: String },

    StageFailed { stage: SetupStage, reason: String },

    SearchPathUpdated { entry: String },
}

impl fmt::Display for RuntimeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled { home } => write!(f, "runtime already installed at {home}"),
            Self::StageEntered { stage, home } => {
                write!(f, "runtime setup for {home}: {}", stage.as_str())
            }
            Self::ArchiveReady { archive, source } => {
                write!(f, "distribution archive {archive} ready (from {source})")
            }
            Self::Extracted {
                archive,
                home,
                skipped: true,
            } => write!(f, "{archive} already extracted in {home}"),
            Self::Extracted { archive, home, .. } => write!(f, "extracted {archive} to {home}"),
            Self::RestrictionFileRemoved { path } => write!(f, "removed restriction file {path}"),
            Self::Ready { home } => write!(f, "runtime ready at {home}"),
            Self::StageFailed { stage, reason } => {
                write!(f, "runtime setup failed while {}: {reason}", stage.as_str())
            }
            Self::SearchPathUpdated { entry } => write!(f, "prepended {entry} to PATH"),
        }
    }
}

//! Non-fatal results of provisioning operations
//!
//! `Err` is reserved for failures the caller must handle (bad input, missing
//! bundled resources, an unavailable package manager). Everything the flow
//! can log and move past is reported here instead.

/// How an operation ended when it did not fail outright
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// Everything went as planned
    Completed(T),
    /// The goal was reached but some steps failed and were logged
    Recovered { value: T, warnings: Vec<String> },
    /// The operation stopped early; the reason was logged
    Aborted { stage: String, reason: String },
}

impl<T> Outcome<T> {
    /// `Completed` when there are no warnings, `Recovered` otherwise
    pub fn with_warnings(value: T, warnings: Vec<String>) -> Self {
        if warnings.is_empty() {
            Self::Completed(value)
        } else {
            Self::Recovered { value, warnings }
        }
    }

    pub fn aborted(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Aborted {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Whether the goal was reached, with or without warnings
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Aborted { .. })
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Completed(value) | Self::Recovered { value, .. } => Some(value),
            Self::Aborted { .. } => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Completed(value) | Self::Recovered { value, .. } => Some(value),
            Self::Aborted { .. } => None,
        }
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Recovered { warnings, .. } => warnings,
            _ => &[],
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::Recovered { value, warnings } => Outcome::Recovered {
                value: f(value),
                warnings,
            },
            Self::Aborted { stage, reason } => Outcome::Aborted { stage, reason },
        }
    }
}

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Component that originated the event.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventSource(Cow<'static, str>);

impl EventSource {
    pub const GENERAL: Self = Self::const_str("general");
    pub const DOWNLOAD: Self = Self::const_str("download");
    pub const PROCESS: Self = Self::const_str("process");
    pub const RUNTIME: Self = Self::const_str("runtime");
    pub const PACKAGE: Self = Self::const_str("package");

    const fn const_str(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    /// Borrow the underlying identifier used for logging.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for EventSource {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetworkError {
    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("destination already exists: {path}")]
    DestinationExists { path: String },

    #[error("download cancelled: {url}")]
    Cancelled { url: String },

    #[error("rate limited: retry after {seconds} seconds")]
    RateLimited { seconds: u64 },
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::ConnectionRefused(_) | Self::DownloadFailed(_) => {
                Some("Check your network connection and retry.")
            }
            Self::HttpError { status, .. } if *status == 404 => {
                Some("Verify the distribution URL in your configuration.")
            }
            Self::DestinationExists { .. } => {
                Some("Remove the stale file or rerun with force enabled.")
            }
            Self::RateLimited { .. } => Some("Wait before retrying the download."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. }
            | Self::DownloadFailed(_)
            | Self::ConnectionRefused(_)
            | Self::RateLimited { .. } => true,
            Self::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Timeout { .. } => "network.timeout",
            Self::DownloadFailed(_) => "network.download_failed",
            Self::ConnectionRefused(_) => "network.connection_refused",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::HttpError { .. } => "network.http_error",
            Self::DestinationExists { .. } => "network.destination_exists",
            Self::Cancelled { .. } => "network.cancelled",
            Self::RateLimited { .. } => "network.rate_limited",
        })
    }
}

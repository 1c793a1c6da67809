use serde::{Deserialize, Serialize};
use std::fmt;

use super::FailureContext;

/// Streaming transfer events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    Started {
        url: String,
        destination: String,
        total_bytes: Option<u64>,
    },

    /// Cumulative progress, emitted once per chunk when the length is known
    Progress {
        url: String,
        bytes_downloaded: u64,
        total_bytes: u64,
        percent: f64,
    },

    Completed {
        url: String,
        destination: String,
        bytes_downloaded: u64,
    },

    /// The transfer failed and the partial destination was removed
    Failed {
        url: String,
        destination: String,
        failure: FailureContext,
    },
}

impl fmt::Display for DownloadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started {
                url, total_bytes, ..
            } => match total_bytes {
                Some(total) => write!(f, "downloading {url} ({total} bytes)"),
                None => write!(f, "downloading {url}"),
            },
            Self::Progress { url, percent, .. } => write!(f, "{url}: {percent:.1}%"),
            Self::Completed {
                url,
                destination,
                bytes_downloaded,
            } => write!(f, "downloaded {url} to {destination} ({bytes_downloaded} bytes)"),
            Self::Failed { url, failure, .. } => {
                write!(f, "download of {url} failed: {}", failure.message)
            }
        }
    }
}

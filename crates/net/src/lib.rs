#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for pyembed
//!
//! This crate handles the HTTP side of provisioning: a pooled client with
//! retry logic and a streaming download that never leaves a partial file
//! behind.

mod client;
mod transfer;

pub use client::{NetClient, NetConfig};
pub use transfer::{ProgressFn, Transfer, CHUNK_SIZE};

use pyembed_errors::{Error, NetworkError};
use pyembed_events::EventSender;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Download `url` into `dest` with optional progress reporting
///
/// # Errors
///
/// Returns an error if the URL is invalid, the destination already exists,
/// the download fails, or it is cancelled. The destination does not exist
/// after an error unless it existed before the call.
pub async fn download_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    progress: Option<ProgressFn<'_>>,
    cancel: &CancellationToken,
    events: Option<&EventSender>,
) -> Result<u64, Error> {
    parse_url(url)?;
    let mut transfer = Transfer::new(url, dest)
        .with_cancellation(cancel)
        .with_events(events);
    if let Some(progress) = progress {
        transfer = transfer.with_progress(progress);
    }
    transfer.execute(client).await
}

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}

/// Last path segment of a URL, the name a downloaded file is stored under
///
/// # Errors
///
/// Returns an error if the URL is invalid or its path has no final segment.
pub fn file_name_from_url(url: &str) -> Result<String, Error> {
    let parsed = parse_url(url)?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| NetworkError::InvalidUrl(format!("{url} has no file name")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://example.com").is_ok());
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url(
                "https://www.python.org/ftp/python/3.7.3/python-3.7.3-embed-amd64.zip"
            )
            .unwrap(),
            "python-3.7.3-embed-amd64.zip"
        );
        assert!(file_name_from_url("https://example.com/").is_err());
    }
}

//! Streaming download into a freshly created file

use futures::TryStreamExt;
use pyembed_errors::{Error, NetworkError};
use pyembed_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

use crate::client::NetClient;

/// Bytes read per progress step
pub const CHUNK_SIZE: usize = 80 * 1024;

/// Progress callback, called with the cumulative percentage after each chunk
pub type ProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// Removes the destination on drop unless the transfer was committed
struct PartialFileGuard {
    path: PathBuf,
    committed: bool,
}

impl PartialFileGuard {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialFileGuard {
    fn drop(&mut self) {
        if !self.committed {
            // Best-effort cleanup - ignore errors
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// One download job
pub struct Transfer<'a> {
    url: &'a str,
    dest: &'a Path,
    progress: Option<ProgressFn<'a>>,
    cancel: Option<&'a CancellationToken>,
    events: Option<&'a EventSender>,
}

impl<'a> Transfer<'a> {
    #[must_use]
    pub fn new(url: &'a str, dest: &'a Path) -> Self {
        Self {
            url,
            dest,
            progress: None,
            cancel: None,
            events: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: Option<&'a EventSender>) -> Self {
        self.events = events;
        self
    }

    /// Run the transfer.
    ///
    /// The destination is opened with exclusive creation, so an existing file
    /// is reported as [`NetworkError::DestinationExists`] and left untouched.
    /// On every other failure the partially written destination is deleted.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, the body cannot be read or written, or the
    /// transfer is cancelled.
    pub async fn execute(self, client: &NetClient) -> Result<u64, Error> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.dest)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    NetworkError::DestinationExists {
                        path: self.dest.display().to_string(),
                    }
                    .into()
                } else {
                    Error::io_with_path(&e, self.dest)
                }
            })?;
        let guard = PartialFileGuard::new(self.dest);

        let result = match self.cancel {
            Some(cancel) => tokio::select! {
                biased;
                () = cancel.cancelled() => Err(NetworkError::Cancelled {
                    url: self.url.to_string(),
                }
                .into()),
                result = self.stream_into(client, file) => result,
            },
            None => self.stream_into(client, file).await,
        };

        match result {
            Ok(bytes) => {
                guard.commit();
                self.emit(AppEvent::Download(DownloadEvent::Completed {
                    url: self.url.to_string(),
                    destination: self.dest.display().to_string(),
                    bytes_downloaded: bytes,
                }));
                Ok(bytes)
            }
            Err(e) => {
                drop(guard);
                self.emit(AppEvent::Download(DownloadEvent::Failed {
                    url: self.url.to_string(),
                    destination: self.dest.display().to_string(),
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    async fn stream_into(&self, client: &NetClient, mut file: File) -> Result<u64, Error> {
        let response = client.get(self.url).await?;

        if !response.status().is_success() {
            return Err(NetworkError::HttpError {
                status: response.status().as_u16(),
                message: response.status().to_string(),
            }
            .into());
        }

        let total = response.content_length();
        self.emit(AppEvent::Download(DownloadEvent::Started {
            url: self.url.to_string(),
            destination: self.dest.display().to_string(),
            total_bytes: total,
        }));

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(stream);

        let report = self.progress.is_some() || self.events.is_some();
        let written = match total {
            Some(total) if total > 0 && report => {
                self.copy_chunked(&mut reader, &mut file, total).await?
            }
            _ => tokio::io::copy(&mut reader, &mut file)
                .await
                .map_err(|e| read_or_write_error(&e, self.dest))?,
        };

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }

    async fn copy_chunked<R>(
        &self,
        reader: &mut R,
        file: &mut File,
        total: u64,
    ) -> Result<u64, Error>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut downloaded = 0u64;

        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|e| read_or_write_error(&e, self.dest))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])
                .await
                .map_err(|e| Error::io_with_path(&e, self.dest))?;
            downloaded += n as u64;

            #[allow(clippy::cast_precision_loss)]
            let percent = (downloaded as f64 / total as f64 * 100.0).min(100.0);
            if let Some(progress) = self.progress {
                progress(percent);
            }
            self.emit(AppEvent::Download(DownloadEvent::Progress {
                url: self.url.to_string(),
                bytes_downloaded: downloaded,
                total_bytes: total,
                percent,
            }));
        }

        Ok(downloaded)
    }
}

/// Body read errors come out of the stream adapter as `io::Error`s of kind
/// `Other`; report those as network failures rather than disk failures.
fn read_or_write_error(err: &std::io::Error, dest: &Path) -> Error {
    if err.kind() == std::io::ErrorKind::Other {
        NetworkError::DownloadFailed(err.to_string()).into()
    } else {
        Error::io_with_path(err, dest)
    }
}

impl EventEmitter for Transfer<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events
    }
}

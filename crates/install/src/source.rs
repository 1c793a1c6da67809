//! Where the distribution archive comes from
//!
//! Every source answers its archive file name without I/O and can place a
//! local copy of the archive into a directory. Transient failures are logged
//! and reported as `Ok(None)`; configuration mistakes are errors.

use async_trait::async_trait;
use pyembed_config::{constants, SourceConfig};
use pyembed_errors::{Error, InstallError};
use pyembed_events::{AppEvent, EventEmitter, EventSender, RuntimeEvent};
use pyembed_net::NetClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::bundle::{DirectoryBundle, ResourceBundle};

/// Per-call inputs for [`ArchiveSource::retrieve`]
pub struct RetrieveContext<'a> {
    pub force: bool,
    pub client: &'a NetClient,
    pub cancel: &'a CancellationToken,
    pub events: Option<&'a EventSender>,
}

impl EventEmitter for RetrieveContext<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events
    }
}

/// A place the distribution archive can be obtained from
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// File name the archive is stored under
    fn archive_file_name(&self) -> &str;

    /// Short description for diagnostics
    fn describe(&self) -> String;

    /// Directory name the archive unpacks to by default
    fn distribution_name(&self) -> String {
        archive_stem(self.archive_file_name())
    }

    /// Place the archive at `dest_dir/<archive_file_name>`.
    ///
    /// An existing copy is reused unless `ctx.force` is set.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that retrying cannot fix, such as
    /// a resource missing from its bundle.
    async fn retrieve(
        &self,
        dest_dir: &Path,
        ctx: &RetrieveContext<'_>,
    ) -> Result<Option<PathBuf>, Error>;

    /// Drop an archive returned by [`retrieve`](Self::retrieve) that turned
    /// out to be unusable, so the next call acquires a fresh copy instead of
    /// reusing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    async fn discard(&self, archive: &Path) -> std::io::Result<()> {
        match tokio::fs::remove_file(archive).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// File name without its archive extension
#[must_use]
pub fn archive_stem(file_name: &str) -> String {
    let lower = file_name.to_ascii_lowercase();
    for ext in [".zip", ".whl"] {
        if lower.ends_with(ext) {
            return file_name[..file_name.len() - ext.len()].to_string();
        }
    }
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string()
}

/// Base name of a `/` or `\` separated identifier
fn base_name(identifier: &str) -> &str {
    identifier
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(identifier)
}

/// Reuse an existing archive copy, or clear it when forced.
///
/// Returns `Some(path)` when the caller can stop.
async fn reuse_or_clear(dest: &Path, ctx: &RetrieveContext<'_>) -> Option<PathBuf> {
    if !dest.exists() {
        return None;
    }
    if !ctx.force {
        ctx.emit_debug(format!("reusing existing archive {}", dest.display()));
        return Some(dest.to_path_buf());
    }
    if let Err(e) = tokio::fs::remove_file(dest).await {
        ctx.emit_warning(format!(
            "could not remove stale archive {}: {e}",
            dest.display()
        ));
    }
    None
}

async fn ensure_dir(dir: &Path, ctx: &RetrieveContext<'_>) -> bool {
    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => true,
        Err(e) => {
            ctx.emit_error(format!("could not create {}: {e}", dir.display()));
            false
        }
    }
}

fn archive_ready(ctx: &RetrieveContext<'_>, archive: &Path, source: String) {
    ctx.emit(AppEvent::Runtime(RuntimeEvent::ArchiveReady {
        archive: archive.display().to_string(),
        source,
    }));
}

/// Download over HTTP(S)
#[derive(Debug, Clone)]
pub struct RemoteSource {
    url: String,
    file_name: String,
}

impl RemoteSource {
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or has no final path segment.
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        let url = url.into();
        let file_name = pyembed_net::file_name_from_url(&url).map_err(|_| {
            InstallError::InvalidArchiveName {
                source_name: url.clone(),
            }
        })?;
        Ok(Self { url, file_name })
    }

    /// The official embeddable build for `version` and `arch` (`amd64`, `win32`)
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL is invalid.
    pub fn python_org(version: &str, arch: &str) -> Result<Self, Error> {
        Self::new(format!(
            "{base}/{version}/python-{version}-embed-{arch}.zip",
            base = constants::DISTRIBUTION_URL_BASE
        ))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ArchiveSource for RemoteSource {
    fn archive_file_name(&self) -> &str {
        &self.file_name
    }

    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn retrieve(
        &self,
        dest_dir: &Path,
        ctx: &RetrieveContext<'_>,
    ) -> Result<Option<PathBuf>, Error> {
        let dest = dest_dir.join(&self.file_name);
        if let Some(existing) = reuse_or_clear(&dest, ctx).await {
            archive_ready(ctx, &existing, self.describe());
            return Ok(Some(existing));
        }
        if !ensure_dir(dest_dir, ctx).await {
            return Ok(None);
        }

        match pyembed_net::download_file(ctx.client, &self.url, &dest, None, ctx.cancel, ctx.events)
            .await
        {
            Ok(_) => {
                archive_ready(ctx, &dest, self.describe());
                Ok(Some(dest))
            }
            Err(e) => {
                ctx.emit_error_with_details(format!("could not download {}", self.url), e.to_string());
                Ok(None)
            }
        }
    }
}

/// Copy a resource out of a bundle
#[derive(Clone)]
pub struct BundledSource {
    bundle: Arc<dyn ResourceBundle>,
    resource: String,
    file_name: String,
}

impl BundledSource {
    /// # Errors
    ///
    /// Returns an error if `resource` has no base name.
    pub fn new(bundle: Arc<dyn ResourceBundle>, resource: impl Into<String>) -> Result<Self, Error> {
        let resource = resource.into();
        let file_name = base_name(&resource).to_string();
        if file_name.is_empty() {
            return Err(InstallError::InvalidArchiveName {
                source_name: resource,
            }
            .into());
        }
        Ok(Self {
            bundle,
            resource,
            file_name,
        })
    }
}

#[async_trait]
impl ArchiveSource for BundledSource {
    fn archive_file_name(&self) -> &str {
        &self.file_name
    }

    fn describe(&self) -> String {
        format!("{}:{}", self.bundle.name(), self.resource)
    }

    async fn retrieve(
        &self,
        dest_dir: &Path,
        ctx: &RetrieveContext<'_>,
    ) -> Result<Option<PathBuf>, Error> {
        let dest = dest_dir.join(&self.file_name);
        if let Some(existing) = reuse_or_clear(&dest, ctx).await {
            archive_ready(ctx, &existing, self.describe());
            return Ok(Some(existing));
        }

        // A missing resource is a packaging mistake, not a transient failure.
        let resolved = self.bundle.resolve(&self.resource).await?;

        let bytes = match self.bundle.read(&resolved).await {
            Ok(bytes) => bytes,
            Err(e) => {
                ctx.emit_error_with_details(
                    format!("could not read bundled resource {resolved}"),
                    e.to_string(),
                );
                return Ok(None);
            }
        };
        if !ensure_dir(dest_dir, ctx).await {
            return Ok(None);
        }
        if let Err(e) = tokio::fs::write(&dest, &bytes).await {
            ctx.emit_error(format!("could not write {}: {e}", dest.display()));
            let _ = tokio::fs::remove_file(&dest).await;
            return Ok(None);
        }

        archive_ready(ctx, &dest, self.describe());
        Ok(Some(dest))
    }
}

/// Copy an archive that is already on disk
#[derive(Debug, Clone)]
pub struct LocalSource {
    path: PathBuf,
    file_name: String,
}

impl LocalSource {
    /// # Errors
    ///
    /// Returns an error if `path` has no file name.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(ToString::to_string)
            .ok_or_else(|| InstallError::InvalidArchiveName {
                source_name: path.display().to_string(),
            })?;
        Ok(Self { path, file_name })
    }
}

#[async_trait]
impl ArchiveSource for LocalSource {
    fn archive_file_name(&self) -> &str {
        &self.file_name
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn retrieve(
        &self,
        dest_dir: &Path,
        ctx: &RetrieveContext<'_>,
    ) -> Result<Option<PathBuf>, Error> {
        if !self.path.is_file() {
            return Err(InstallError::LocalArchiveNotFound {
                path: self.path.display().to_string(),
            }
            .into());
        }

        let dest = dest_dir.join(&self.file_name);
        if dest == self.path {
            archive_ready(ctx, &dest, self.describe());
            return Ok(Some(dest));
        }
        if let Some(existing) = reuse_or_clear(&dest, ctx).await {
            archive_ready(ctx, &existing, self.describe());
            return Ok(Some(existing));
        }
        if !ensure_dir(dest_dir, ctx).await {
            return Ok(None);
        }
        if let Err(e) = tokio::fs::copy(&self.path, &dest).await {
            ctx.emit_error(format!(
                "could not copy {} to {}: {e}",
                self.path.display(),
                dest.display()
            ));
            let _ = tokio::fs::remove_file(&dest).await;
            return Ok(None);
        }

        archive_ready(ctx, &dest, self.describe());
        Ok(Some(dest))
    }

    /// The caller's own file is never removed, only the copy made from it
    async fn discard(&self, archive: &Path) -> std::io::Result<()> {
        if archive == self.path {
            return Ok(());
        }
        match tokio::fs::remove_file(archive).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Build the source a configuration describes
///
/// # Errors
///
/// Returns an error if the descriptor cannot name an archive file.
pub fn source_from_config(config: &SourceConfig) -> Result<Arc<dyn ArchiveSource>, Error> {
    Ok(match config {
        SourceConfig::Remote { url } => Arc::new(RemoteSource::new(url.clone())?),
        SourceConfig::Local { path } => Arc::new(LocalSource::new(path.clone())?),
        SourceConfig::Directory { dir, resource } => Arc::new(BundledSource::new(
            Arc::new(DirectoryBundle::new(dir.clone())),
            resource.clone(),
        )?),
    })
}

use pyembed_config::constants;
use pyembed_errors::{Error, InstallError};
use pyembed_events::{EventEmitter, InstallMethod, PackageEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use super::{package_name_from_archive, PackageStatus};
use crate::bundle::ResourceBundle;
use crate::context::ProvisionContext;
use crate::extract::extract_zip;
use crate::layout::find_restriction_file;
use crate::outcome::Outcome;

/// Where a package archive is read from
#[derive(Clone)]
pub enum PackageArchive {
    File(PathBuf),
    Bundled {
        bundle: Arc<dyn ResourceBundle>,
        resource: String,
    },
}

impl PackageArchive {
    fn file_name(&self) -> Option<&str> {
        match self {
            Self::File(path) => path.file_name().and_then(|n| n.to_str()),
            Self::Bundled { resource, .. } => resource.rsplit(['/', '\\']).next(),
        }
    }

    /// Check the archive is reachable without writing anything
    async fn locate(&self) -> Result<Option<String>, Error> {
        match self {
            Self::File(path) => {
                if path.is_file() {
                    Ok(None)
                } else {
                    Err(InstallError::LocalArchiveNotFound {
                        path: path.display().to_string(),
                    }
                    .into())
                }
            }
            Self::Bundled { bundle, resource } => bundle.resolve(resource).await.map(Some),
        }
    }

    async fn copy_to(&self, resolved: Option<&str>, dest: &Path) -> Result<(), Error> {
        match (self, resolved) {
            (Self::Bundled { bundle, .. }, Some(resolved)) => {
                let bytes = bundle.read(resolved).await?;
                tokio::fs::write(dest, bytes)
                    .await
                    .map_err(|e| Error::io_with_path(&e, dest))
            }
            (Self::File(path), _) => tokio::fs::copy(path, dest)
                .await
                .map(|_| ())
                .map_err(|e| Error::io_with_path(&e, path)),
            (Self::Bundled { resource, .. }, None) => {
                Err(Error::internal(format!("{resource} was not resolved")))
            }
        }
    }
}

/// Options for [`install_archive_package`]
#[derive(Debug, Clone)]
pub struct ArchiveInstallOptions {
    /// Reinstall even when `Lib/<name>` exists
    pub force: bool,
}

options_builder! {
    ArchiveInstallOptions {
        force: bool,
    }
}

/// Whether `Lib/<package>` exists
#[must_use]
pub fn is_archive_package_installed(ctx: &ProvisionContext, package: &str) -> bool {
    ctx.layout()
        .archive_package_dir(&ctx.home(), package)
        .exists()
}

/// Append `./Lib` to the restriction file unless it is already listed.
///
/// A runtime without a restriction file already searches `Lib`, so nothing
/// is created in that case. Returns the patched file, if any.
async fn enable_lib_search(home: &Path) -> std::io::Result<Option<PathBuf>> {
    let Some(path) = find_restriction_file(home).await? else {
        return Ok(None);
    };
    let contents = tokio::fs::read_to_string(&path).await?;
    if contents
        .lines()
        .any(|line| line.trim() == constants::LIB_SEARCH_ENTRY)
    {
        return Ok(None);
    }

    let mut addition = String::new();
    if !contents.is_empty() && !contents.ends_with('\n') {
        addition.push('\n');
    }
    addition.push_str(constants::LIB_SEARCH_ENTRY);
    addition.push('\n');

    let mut file = tokio::fs::OpenOptions::new().append(true).open(&path).await?;
    file.write_all(addition.as_bytes()).await?;
    file.flush().await?;
    Ok(Some(path))
}

fn warn(ctx: &ProvisionContext, warnings: &mut Vec<String>, message: String) {
    ctx.emit_warning(message.clone());
    warnings.push(message);
}

/// Install a package by unpacking its archive into the library directory.
///
/// The archive is copied into `Lib`, extracted there, and removed again.
/// Extraction and restriction-file problems are logged and the flow
/// continues; they show up as warnings on the returned outcome.
///
/// # Errors
///
/// Returns an error if no package name can be derived from the archive
/// name, or the archive cannot be found.
pub async fn install_archive_package(
    ctx: &ProvisionContext,
    archive: &PackageArchive,
    options: &ArchiveInstallOptions,
) -> Result<Outcome<PackageStatus>, Error> {
    let file_name = archive
        .file_name()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| InstallError::InvalidPackageName {
            file_name: String::new(),
        })?
        .to_string();
    let package = package_name_from_archive(&file_name)?;

    if !options.force && is_archive_package_installed(ctx, &package) {
        ctx.emit_package(PackageEvent::AlreadyInstalled {
            package,
            method: InstallMethod::Archive,
        });
        return Ok(Outcome::Completed(PackageStatus::AlreadyInstalled));
    }

    let resolved = archive.locate().await?;

    ctx.emit_package(PackageEvent::InstallStarted {
        package: package.clone(),
        method: InstallMethod::Archive,
        version: None,
    });

    let home = ctx.home();
    let lib = ctx.layout().lib_dir(&home);
    let failed = |reason: String| {
        ctx.emit_package(PackageEvent::InstallFailed {
            package: package.clone(),
            method: InstallMethod::Archive,
            reason: reason.clone(),
        });
        Outcome::aborted("copy archive", reason)
    };

    if let Err(e) = tokio::fs::create_dir_all(&lib).await {
        return Ok(failed(format!("could not create {}: {e}", lib.display())));
    }

    let staged = lib.join(&file_name);
    if let Err(e) = archive.copy_to(resolved.as_deref(), &staged).await {
        let _ = tokio::fs::remove_file(&staged).await;
        return Ok(failed(e.to_string()));
    }

    let mut warnings = Vec::new();

    match extract_zip(&staged, &lib, !options.force).await {
        Ok(report) if report.skipped => {
            ctx.emit_debug(format!("{file_name} already extracted in {}", lib.display()));
        }
        Ok(_) => {}
        Err(e) => warn(ctx, &mut warnings, format!("extracting {file_name}: {e}")),
    }

    match enable_lib_search(&home).await {
        Ok(Some(path)) => ctx.emit_package(PackageEvent::SearchPathPatched {
            restriction_file: path.display().to_string(),
        }),
        Ok(None) => ctx.emit_debug(format!(
            "{} already searchable in {}",
            constants::LIB_SEARCH_ENTRY,
            home.display()
        )),
        Err(e) => warn(
            ctx,
            &mut warnings,
            format!("could not update restriction file in {}: {e}", home.display()),
        ),
    }

    if let Err(e) = tokio::fs::remove_file(&staged).await {
        warn(
            ctx,
            &mut warnings,
            format!("could not remove {}: {e}", staged.display()),
        );
    }

    ctx.emit_package(PackageEvent::InstallCompleted {
        package,
        method: InstallMethod::Archive,
    });
    Ok(Outcome::with_warnings(PackageStatus::Installed, warnings))
}

//! Installation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstallError {
    #[error("cannot derive a package name from {file_name}")]
    InvalidPackageName { file_name: String },

    #[error("invalid version pin for {package}: {version}")]
    InvalidVersion { package: String, version: String },

    #[error("resource {resource} not found in bundle {bundle}")]
    ResourceNotFound { resource: String, bundle: String },

    #[error("local archive not found: {path}")]
    LocalArchiveNotFound { path: String },

    #[error("cannot derive an archive file name from {source_name}")]
    InvalidArchiveName { source_name: String },

    #[error("package manager not available in {home}")]
    PackageManagerUnavailable { home: String },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidPackageName { .. } => {
                Some("Package archives must be named `<name>-<version>-...`.")
            }
            Self::ResourceNotFound { .. } => {
                Some("The bundled asset is missing; check how the application was packaged.")
            }
            Self::PackageManagerUnavailable { .. } => {
                Some("Ensure the runtime is installed and the bootstrap script is reachable.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PackageManagerUnavailable { .. } | Self::FilesystemError { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InvalidPackageName { .. } => "install.invalid_package_name",
            Self::InvalidVersion { .. } => "install.invalid_version",
            Self::ResourceNotFound { .. } => "install.resource_not_found",
            Self::LocalArchiveNotFound { .. } => "install.local_archive_not_found",
            Self::InvalidArchiveName { .. } => "install.invalid_archive_name",
            Self::PackageManagerUnavailable { .. } => "install.package_manager_unavailable",
            Self::ExtractionFailed { .. } => "install.extraction_failed",
            Self::FilesystemError { .. } => "install.filesystem",
        })
    }
}

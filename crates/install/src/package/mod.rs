//! Package installation into a provisioned runtime
//!
//! Two routes: unpacking a package archive straight into the library
//! directory, or driving the package manager as a subprocess.

mod archive;
mod pip;

pub use archive::{
    install_archive_package, is_archive_package_installed, ArchiveInstallOptions, PackageArchive,
};
pub use pip::{
    ensure_package_manager, install_package, is_package_installed, is_package_manager_installed,
    PackageManagerStatus, PipInstallOptions,
};

use pyembed_errors::InstallError;
use std::path::Path;

/// What a package install found or did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    AlreadyInstalled,
    Installed,
}

/// Package names end up on a shell command line, so only a conservative
/// character set is accepted.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Check a package name before it is used in a command or a path
///
/// # Errors
///
/// Returns [`InstallError::InvalidPackageName`] for empty names or names with
/// characters outside `[A-Za-z0-9._-]`.
pub fn validate_package_name(name: &str) -> Result<(), InstallError> {
    if is_valid_name(name) && !name.starts_with('-') {
        Ok(())
    } else {
        Err(InstallError::InvalidPackageName {
            file_name: name.to_string(),
        })
    }
}

/// Check a version pin
///
/// # Errors
///
/// Returns [`InstallError::InvalidVersion`] for empty pins or pins with
/// characters outside `[A-Za-z0-9._*+!-]`.
pub fn validate_version(package: &str, version: &str) -> Result<(), InstallError> {
    let valid = !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '*' | '+' | '!' | '-'));
    if valid {
        Ok(())
    } else {
        Err(InstallError::InvalidVersion {
            package: package.to_string(),
            version: version.to_string(),
        })
    }
}

/// Package name of an archive: the file stem up to the first hyphen.
///
/// `numpy-1.16.3-cp37-cp37m-win_amd64.whl` gives `numpy`; `numpy.whl` gives
/// `numpy`.
///
/// # Errors
///
/// Returns [`InstallError::InvalidPackageName`] when the result is empty or
/// contains characters that are not allowed in a package name.
pub fn package_name_from_archive(file_name: &str) -> Result<String, InstallError> {
    let invalid = || InstallError::InvalidPackageName {
        file_name: file_name.to_string(),
    };
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(invalid)?;
    let name = stem.split('-').next().unwrap_or_default();
    if is_valid_name(name) {
        Ok(name.to_string())
    } else {
        Err(invalid())
    }
}

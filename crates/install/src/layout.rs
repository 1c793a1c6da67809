//! Paths inside a distribution home

use pyembed_config::{constants, LayoutConfig};
use std::path::{Path, PathBuf};

/// Relative locations of the interpreter, library and scripts directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLayout {
    executable: PathBuf,
    lib_dir: PathBuf,
    scripts_dir: PathBuf,
    package_manager_executable: PathBuf,
}

impl Default for RuntimeLayout {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

impl From<&LayoutConfig> for RuntimeLayout {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            lib_dir: config.lib_dir.clone(),
            scripts_dir: config.scripts_dir.clone(),
            package_manager_executable: config.package_manager_executable.clone(),
        }
    }
}

impl RuntimeLayout {
    #[must_use]
    pub fn executable(&self, home: &Path) -> PathBuf {
        home.join(&self.executable)
    }

    #[must_use]
    pub fn lib_dir(&self, home: &Path) -> PathBuf {
        home.join(&self.lib_dir)
    }

    #[must_use]
    pub fn site_packages(&self, home: &Path) -> PathBuf {
        self.lib_dir(home).join(constants::SITE_PACKAGES_DIR)
    }

    #[must_use]
    pub fn scripts_dir(&self, home: &Path) -> PathBuf {
        home.join(&self.scripts_dir)
    }

    #[must_use]
    pub fn package_manager_executable(&self, home: &Path) -> PathBuf {
        home.join(&self.package_manager_executable)
    }

    /// Marker whose presence means the package manager installed `package`
    #[must_use]
    pub fn package_initializer(&self, home: &Path, package: &str) -> PathBuf {
        self.site_packages(home)
            .join(package)
            .join(constants::PACKAGE_INITIALIZER)
    }

    /// Directory an archive-installed package unpacks to
    #[must_use]
    pub fn archive_package_dir(&self, home: &Path, package: &str) -> PathBuf {
        self.lib_dir(home).join(package)
    }
}

/// Locate the `<versionTag>._pth` restriction file directly inside `home`.
///
/// If several match, the lexically first is returned so repeated calls agree.
///
/// # Errors
///
/// Returns an error if `home` cannot be listed.
pub async fn find_restriction_file(home: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(home).await?;
    let mut found: Option<PathBuf> = None;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let is_match = name
            .to_str()
            .is_some_and(|n| n.ends_with(constants::RESTRICTION_FILE_SUFFIX));
        if is_match && entry.file_type().await?.is_file() {
            let path = entry.path();
            if found.as_ref().is_none_or(|current| path < *current) {
                found = Some(path);
            }
        }
    }
    Ok(found)
}

//! Configuration sections

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants;

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Directory that holds downloaded archives and the distribution home
    pub install_root: Option<PathBuf>,
}

/// Where the distribution archive comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Download over HTTPS
    Remote { url: String },
    /// Copy an archive that is already on disk
    Local { path: PathBuf },
    /// Copy a named resource out of a directory bundle
    Directory { dir: PathBuf, resource: String },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Remote {
            url: constants::DEFAULT_DISTRIBUTION_URL.to_string(),
        }
    }
}

/// What to do with the restriction file shipped with the distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionPolicy {
    /// Delete it after extraction so site-packages is searched
    #[default]
    Remove,
    /// Leave it in place; archive installs append `./Lib` to it
    Keep,
}

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub source: SourceConfig,
    /// Overrides the directory name derived from the archive
    pub directory_name: Option<String>,
    /// Re-acquire and re-extract even when already installed
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub restriction_file: RestrictionPolicy,
}

/// Package manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManagerConfig {
    #[serde(default = "default_bootstrap_url")]
    pub bootstrap_url: String,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            bootstrap_url: default_bootstrap_url(),
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

/// Relative locations inside the distribution home
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    #[serde(default = "default_lib_dir")]
    pub lib_dir: PathBuf,
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,
    #[serde(default = "default_package_manager_executable")]
    pub package_manager_executable: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            lib_dir: default_lib_dir(),
            scripts_dir: default_scripts_dir(),
            package_manager_executable: default_package_manager_executable(),
        }
    }
}

// Default value functions for serde
fn default_bootstrap_url() -> String {
    constants::DEFAULT_BOOTSTRAP_URL.to_string()
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1
}

fn default_executable() -> PathBuf {
    PathBuf::from(constants::EXECUTABLE)
}

fn default_lib_dir() -> PathBuf {
    PathBuf::from(constants::LIB_DIR)
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from(constants::SCRIPTS_DIR)
}

fn default_package_manager_executable() -> PathBuf {
    PathBuf::from(constants::PACKAGE_MANAGER_EXECUTABLE)
}

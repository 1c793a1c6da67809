#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for pyembed
//!
//! Configuration is loaded and merged from:
//! - Default values (hard-coded)
//! - Configuration file (`<config_dir>/pyembed/config.toml`)
//! - Environment variables (`PYEMBED_*`)
//!
//! The result is plain data; the install crate turns it into a session
//! context that every operation takes explicitly.

pub mod constants;
pub mod core;

pub use core::{
    LayoutConfig, NetworkConfig, PackageManagerConfig, PathConfig, RestrictionPolicy,
    RuntimeConfig, SourceConfig,
};

use pyembed_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub package_manager: PackageManagerConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub layout: LayoutConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NoDefaultDirectory {
            purpose: "configuration".to_string(),
        })?;
        Ok(config_dir.join("pyembed").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn parse(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the default file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds a value that cannot
    /// be parsed into the expected type.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(root) = std::env::var("PYEMBED_INSTALL_ROOT") {
            if root.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "PYEMBED_INSTALL_ROOT".to_string(),
                    value: root,
                }
                .into());
            }
            self.paths.install_root = Some(PathBuf::from(root));
        }

        if let Ok(name) = std::env::var("PYEMBED_DIRECTORY_NAME") {
            self.runtime.directory_name = if name.is_empty() { None } else { Some(name) };
        }

        if let Ok(url) = std::env::var("PYEMBED_SOURCE_URL") {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    field: "PYEMBED_SOURCE_URL".to_string(),
                    value: url,
                }
                .into());
            }
            self.runtime.source = SourceConfig::Remote { url };
        }

        if let Ok(force) = std::env::var("PYEMBED_FORCE") {
            self.runtime.force = parse_bool("PYEMBED_FORCE", force)?;
        }

        if let Ok(url) = std::env::var("PYEMBED_BOOTSTRAP_URL") {
            self.package_manager.bootstrap_url = url;
        }

        Ok(())
    }

    /// Get the install root (with default)
    ///
    /// # Errors
    ///
    /// Returns an error if no root is configured and the platform has no
    /// local data directory.
    pub fn install_root(&self) -> Result<PathBuf, Error> {
        if let Some(root) = &self.paths.install_root {
            return Ok(root.clone());
        }
        dirs::data_local_dir()
            .map(|dir| dir.join("pyembed"))
            .ok_or_else(|| {
                ConfigError::NoDefaultDirectory {
                    purpose: "install_root".to_string(),
                }
                .into()
            })
    }
}

fn parse_bool(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.runtime.source, SourceConfig::default());
        assert_eq!(config.runtime.restriction_file, RestrictionPolicy::Remove);
        assert!(!config.runtime.force);
        assert_eq!(
            config.package_manager.bootstrap_url,
            constants::DEFAULT_BOOTSTRAP_URL
        );
        assert_eq!(config.layout.lib_dir, PathBuf::from("Lib"));
    }

    #[test]
    fn test_explicit_install_root_wins() {
        let mut config = Config::default();
        config.paths.install_root = Some(PathBuf::from("/srv/runtimes"));
        assert_eq!(config.install_root().unwrap(), PathBuf::from("/srv/runtimes"));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "yes".into()).unwrap());
        assert!(!parse_bool("X", "0".into()).unwrap());
        assert!(parse_bool("X", "maybe".into()).is_err());
    }
}

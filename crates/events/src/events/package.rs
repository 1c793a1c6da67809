use serde::{Deserialize, Serialize};
use std::fmt;

/// How a package reaches the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallMethod {
    Archive,
    PackageManager,
}

impl InstallMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::PackageManager => "pip",
        }
    }
}

/// Package installation events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PackageEvent {
    AlreadyInstalled {
        package: String,
        method: InstallMethod,
    },

    InstallStarted {
        package: String,
        method: InstallMethod,
        version: Option<String>,
    },

    InstallCompleted {
        package: String,
        method: InstallMethod,
    },

    InstallFailed {
        package: String,
        method: InstallMethod,
        reason: String,
    },

    /// `./Lib` was appended to the restriction file
    SearchPathPatched { restriction_file: String },

    PackageManagerPresent { executable: String },

    PackageManagerBootstrapping { script_url: String },

    PackageManagerBootstrapped { executable: String },
}

impl fmt::Display for PackageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled { package, method } => {
                write!(f, "{package} already installed ({})", method.as_str())
            }
            Self::InstallStarted {
                package,
                method,
                version,
            } => match version {
                Some(version) => {
                    write!(f, "installing {package}=={version} ({})", method.as_str())
                }
                None => write!(f, "installing {package} ({})", method.as_str()),
            },
            Self::InstallCompleted { package, method } => {
                write!(f, "installed {package} ({})", method.as_str())
            }
            Self::InstallFailed {
                package,
                method,
                reason,
            } => write!(f, "installing {package} ({}) failed: {reason}", method.as_str()),
            Self::SearchPathPatched { restriction_file } => {
                write!(f, "enabled ./Lib in {restriction_file}")
            }
            Self::PackageManagerPresent { executable } => {
                write!(f, "package manager present at {executable}")
            }
            Self::PackageManagerBootstrapping { script_url } => {
                write!(f, "bootstrapping package manager from {script_url}")
            }
            Self::PackageManagerBootstrapped { executable } => {
                write!(f, "package manager installed at {executable}")
            }
        }
    }
}

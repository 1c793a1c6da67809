//! Well-known locations and file names for the embeddable distribution
//!
//! These describe the upstream distribution format rather than user
//! preferences, so they are not exposed through TOML.

pub const DEFAULT_PYTHON_VERSION: &str = "3.7.3";
pub const DEFAULT_ARCH: &str = "amd64";

pub const DISTRIBUTION_URL_BASE: &str = "https://www.python.org/ftp/python";
pub const DEFAULT_DISTRIBUTION_URL: &str =
    "https://www.python.org/ftp/python/3.7.3/python-3.7.3-embed-amd64.zip";

pub const DEFAULT_BOOTSTRAP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";
pub const BOOTSTRAP_SCRIPT_NAME: &str = "get-pip.py";

/// Suffix of the module-search restriction file (`python37._pth`)
pub const RESTRICTION_FILE_SUFFIX: &str = "._pth";
/// Line that enables the library directory in the restriction file
pub const LIB_SEARCH_ENTRY: &str = "./Lib";

pub const LIB_DIR: &str = "Lib";
pub const SITE_PACKAGES_DIR: &str = "site-packages";
pub const SCRIPTS_DIR: &str = "Scripts";
pub const PACKAGE_INITIALIZER: &str = "__init__.py";

/// Interpreter path inside the embeddable archive. The archive layout is the
/// same whatever the host, so this is not chosen per platform.
pub const EXECUTABLE: &str = "python.exe";
pub const PACKAGE_MANAGER_EXECUTABLE: &str = "Scripts/pip.exe";

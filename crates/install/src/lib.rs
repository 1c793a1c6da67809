#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Provisioning of an embeddable Python distribution
//!
//! This crate acquires the distribution archive (download, bundled resource
//! or local file), extracts it into a per-distribution home, patches the
//! module search configuration and installs packages, either by unpacking
//! package archives or through the package manager.
//!
//! Every entry point takes a [`ProvisionContext`]; no state is kept between
//! calls apart from what is on disk.

#[macro_use]
mod macros;
pub mod bundle;
mod context;
pub mod extract;
pub mod layout;
mod outcome;
pub mod package;
mod runtime;
pub mod source;

pub use bundle::{DirectoryBundle, EmbeddedBundle, ResourceBundle};
pub use context::ProvisionContext;
pub use extract::{extract_zip, ExtractReport};
pub use layout::RuntimeLayout;
pub use outcome::Outcome;
pub use package::{
    ensure_package_manager, install_archive_package, install_package,
    is_archive_package_installed, is_package_installed, is_package_manager_installed,
    package_name_from_archive, ArchiveInstallOptions, PackageArchive, PackageManagerStatus,
    PackageStatus, PipInstallOptions,
};
pub use runtime::{ensure_runtime, is_runtime_installed, RuntimeStatus};
pub use source::{
    source_from_config, ArchiveSource, BundledSource, LocalSource, RemoteSource, RetrieveContext,
};

// Re-exported so callers only need this crate for the common flow
pub use pyembed_config::{Config, RestrictionPolicy};
pub use pyembed_events::EventSender;
pub use pyembed_platform::{CancellationToken, CommandOutcome};

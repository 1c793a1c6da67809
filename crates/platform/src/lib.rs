#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for pyembed
//!
//! This crate provides:
//! - Shell selection (`sh -c` on Unix-like hosts, `cmd.exe /C` on Windows)
//! - Command execution with line-by-line output events and cancellation
//! - Process search-path manipulation

pub mod core;
pub mod env;
pub mod implementations;
pub mod process;

pub use core::{Platform, PlatformContext};
pub use implementations::{ShellProcessOperations, UnixShell, WindowsShell};
pub use process::{CommandOutcome, PlatformCommand, ProcessOperations, ShellInvoker};

/// Re-exported so callers do not need a direct `tokio-util` dependency
pub use tokio_util::sync::CancellationToken;

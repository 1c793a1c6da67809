//! Shell and process implementations

mod runner;
mod unix;
mod windows;

pub use runner::ShellProcessOperations;
pub use unix::UnixShell;
pub use windows::WindowsShell;

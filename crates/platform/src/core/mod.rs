//! Core platform abstractions and context management

use pyembed_events::{EventEmitter, EventSender};
use std::path::Path;

use crate::implementations::ShellProcessOperations;
use crate::process::{CommandOutcome, ProcessOperations, ShellInvoker};
use tokio_util::sync::CancellationToken;

/// Context for platform operations, carrying the event channel
#[derive(Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    #[must_use]
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self { event_sender }
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Main platform abstraction providing access to process operations
pub struct Platform {
    process_ops: Box<dyn ProcessOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementation
    #[must_use]
    pub fn new(process_ops: Box<dyn ProcessOperations>) -> Self {
        Self { process_ops }
    }

    /// Platform for the host this binary was compiled for
    #[must_use]
    pub fn current() -> Self {
        Self::with_shell(host_shell())
    }

    /// Platform that runs commands through the given shell
    #[must_use]
    pub fn with_shell(shell: Box<dyn ShellInvoker>) -> Self {
        Self::new(Box::new(ShellProcessOperations::new(shell)))
    }

    /// Access process operations
    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Create a platform context with event emission
    #[must_use]
    pub fn create_context(&self, event_sender: Option<EventSender>) -> PlatformContext {
        PlatformContext::new(event_sender)
    }

    /// Convenience method: run a command line through the shell
    pub async fn run_command(
        &self,
        ctx: &PlatformContext,
        command_line: &str,
        cwd: Option<&Path>,
        cancel: &CancellationToken,
    ) -> CommandOutcome {
        self.process().run_shell(ctx, command_line, cwd, cancel).await
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(windows)]
fn host_shell() -> Box<dyn ShellInvoker> {
    Box::new(crate::implementations::WindowsShell)
}

#[cfg(not(windows))]
fn host_shell() -> Box<dyn ShellInvoker> {
    Box::new(crate::implementations::UnixShell)
}


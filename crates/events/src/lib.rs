#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for pyembed
//!
//! Every diagnostic line produced while provisioning a runtime travels as an
//! [`AppEvent`] over an explicitly injected channel. Nothing in the library
//! prints or logs directly; the owner of the receiver decides what to do with
//! the stream (see [`logging`] for the `tracing` bridge).

pub mod events;
pub mod logging;
pub mod meta;

pub use events::{
    AppEvent, DownloadEvent, FailureContext, GeneralEvent, InstallMethod, OutputStream,
    PackageEvent, ProcessEvent, RuntimeEvent, SetupStage,
};
pub use meta::EventSource;

use tokio::sync::mpsc::UnboundedSender;

/// Sending half of the event channel
pub type EventSender = UnboundedSender<AppEvent>;

/// Receiving half of the event channel
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented for a raw `EventSender` and for any context that may or may
/// not carry one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Emit an error event with details
    fn emit_error_with_details(&self, message: impl Into<String>, details: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error_with_details(
            message, details,
        )));
    }

    /// Emit an operation started event
    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    /// Emit an operation completed event
    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    /// Emit an operation failed event
    fn emit_operation_failed(&self, operation: impl Into<String>, error: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.into(),
            error: error.into(),
        }));
    }

    fn emit_runtime(&self, event: RuntimeEvent) {
        self.emit(AppEvent::Runtime(event));
    }

    fn emit_package(&self, event: PackageEvent) {
        self.emit(AppEvent::Package(event));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_levels() {
        let failed = AppEvent::Runtime(RuntimeEvent::StageFailed {
            stage: SetupStage::Acquiring,
            reason: "offline".into(),
        });
        assert_eq!(failed.log_level(), tracing::Level::ERROR);
        assert_eq!(failed.log_target(), "pyembed::events::runtime");

        let nonzero = AppEvent::Process(ProcessEvent::Exited {
            command: "false".into(),
            exit_code: Some(1),
            duration_ms: 3,
        });
        assert_eq!(nonzero.log_level(), tracing::Level::WARN);

        let clean = AppEvent::Process(ProcessEvent::Exited {
            command: "true".into(),
            exit_code: Some(0),
            duration_ms: 3,
        });
        assert_eq!(clean.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_display_is_the_log_line() {
        let line = AppEvent::Process(ProcessEvent::Output {
            stream: OutputStream::Stderr,
            line: "Collecting numpy".into(),
        });
        assert_eq!(line.to_string(), "Collecting numpy");

        let exit = AppEvent::Process(ProcessEvent::Exited {
            command: "pip install x".into(),
            exit_code: Some(2),
            duration_ms: 10,
        });
        assert_eq!(exit.to_string(), "`pip install x` exited with code 2");
    }

    #[test]
    fn test_absent_sender_is_silent() {
        let none: Option<EventSender> = None;
        none.emit_warning("nobody listens");
    }
}

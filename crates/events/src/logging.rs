//! Bridge from the event channel into `tracing`
//!
//! Library crates only emit events. Whoever owns the receiver decides how
//! they are rendered; these helpers give the common answer of "log them".

use tracing::{debug, error, info, trace, warn, Level};

use crate::{AppEvent, EventReceiver};

/// Log a single event at its own level with its source as a structured field
pub fn log_event(event: &AppEvent) {
    let source = event.event_source();
    let source = source.as_str();
    let target = event.log_target();

    match event.log_level() {
        Level::ERROR => error!(source, log_target = target, "{event}"),
        Level::WARN => warn!(source, log_target = target, "{event}"),
        Level::INFO => info!(source, log_target = target, "{event}"),
        Level::DEBUG => debug!(source, log_target = target, "{event}"),
        _ => trace!(source, log_target = target, "{event}"),
    }
}

/// Drain a receiver into `tracing` until every sender is dropped.
///
/// Returns the number of events forwarded.
pub async fn forward_to_tracing(mut rx: EventReceiver) -> usize {
    let mut forwarded = 0;
    while let Some(event) = rx.recv().await {
        log_event(&event);
        forwarded += 1;
    }
    forwarded
}

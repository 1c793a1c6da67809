//! Integration tests for events

#[cfg(test)]
mod tests {
    use pyembed_events::*;

    #[tokio::test]
    async fn test_event_emitter() {
        let (tx, mut rx) = channel();

        tx.emit_error("test error");
        tx.emit_debug("test debug");

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(event1, AppEvent::General(GeneralEvent::Error { .. })));

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            AppEvent::General(GeneralEvent::DebugLog { .. })
        ));
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[tokio::test]
    async fn test_forward_to_tracing_drains_until_senders_drop() {
        let (tx, rx) = channel();
        tx.emit_operation_started("ensure runtime");
        tx.emit_runtime(RuntimeEvent::Ready {
            home: "/opt/python".into(),
        });
        drop(tx);

        assert_eq!(logging::forward_to_tracing(rx).await, 2);
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Package(PackageEvent::AlreadyInstalled {
            package: "numpy".into(),
            method: InstallMethod::Archive,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "package");
        assert_eq!(json["event"]["type"], "already_installed");
        assert_eq!(json["event"]["method"], "archive");
    }
}

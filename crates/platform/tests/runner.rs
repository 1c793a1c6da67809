//! Shell runner behaviour against the real system shell

#![cfg(unix)]

use pyembed_events::{AppEvent, EventReceiver, OutputStream, ProcessEvent};
use pyembed_platform::{
    CommandOutcome, CancellationToken, Platform, PlatformCommand, PlatformContext, ShellInvoker,
};
use std::time::{Duration, Instant};

fn context() -> (PlatformContext, EventReceiver) {
    let (tx, rx) = pyembed_events::channel();
    (PlatformContext::new(Some(tx)), rx)
}

fn drain(rx: &mut EventReceiver) -> Vec<ProcessEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let AppEvent::Process(event) = event {
            events.push(event);
        }
    }
    events
}

fn output_lines(events: &[ProcessEvent], wanted: OutputStream) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ProcessEvent::Output { stream, line } if *stream == wanted => Some(line.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_streams_each_line_in_order() {
    let platform = Platform::current();
    let (ctx, mut rx) = context();
    let cancel = CancellationToken::new();

    let outcome = platform
        .run_command(&ctx, "echo one; echo two >&2; echo three", None, &cancel)
        .await;

    assert_eq!(outcome, CommandOutcome::Exited { code: Some(0) });
    assert!(outcome.success());

    let events = drain(&mut rx);
    assert!(matches!(
        events.first(),
        Some(ProcessEvent::Started { shell, .. }) if shell == "sh"
    ));
    assert_eq!(output_lines(&events, OutputStream::Stdout), ["one", "three"]);
    assert_eq!(output_lines(&events, OutputStream::Stderr), ["two"]);
    assert!(matches!(
        events.last(),
        Some(ProcessEvent::Exited { exit_code: Some(0), .. })
    ));
}

#[tokio::test]
async fn test_nonzero_exit_is_reported_not_raised() {
    let platform = Platform::current();
    let (ctx, mut rx) = context();
    let cancel = CancellationToken::new();

    let outcome = platform
        .run_command(&ctx, "echo failing; exit 3", None, &cancel)
        .await;

    assert_eq!(outcome, CommandOutcome::Exited { code: Some(3) });
    assert!(!outcome.success());
    assert_eq!(outcome.exit_code(), Some(3));

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, ProcessEvent::Exited { exit_code: Some(3), .. })));
}

#[tokio::test]
async fn test_runs_in_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

    let platform = Platform::current();
    let (ctx, mut rx) = context();
    let cancel = CancellationToken::new();

    let outcome = platform
        .run_command(&ctx, "cat marker.txt", Some(dir.path()), &cancel)
        .await;

    assert!(outcome.success());
    let events = drain(&mut rx);
    assert_eq!(output_lines(&events, OutputStream::Stdout), ["here"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancellation_stops_long_command() {
    let platform = Platform::current();
    let (ctx, mut rx) = context();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let outcome = platform
        .run_command(&ctx, "echo started; sleep 30", None, &cancel)
        .await;

    assert_eq!(outcome, CommandOutcome::Cancelled);
    assert!(start.elapsed() < Duration::from_secs(10));
    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, ProcessEvent::Cancelled { .. })));
}

#[tokio::test]
async fn test_already_cancelled_never_spawns() {
    let platform = Platform::current();
    let (ctx, mut rx) = context();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = platform.run_command(&ctx, "echo nope", None, &cancel).await;

    assert_eq!(outcome, CommandOutcome::Cancelled);
    let events = drain(&mut rx);
    assert!(output_lines(&events, OutputStream::Stdout).is_empty());
}

struct MissingShell;

impl ShellInvoker for MissingShell {
    fn name(&self) -> &'static str {
        "missing"
    }

    fn wrap(&self, command_line: &str) -> PlatformCommand {
        let mut cmd = PlatformCommand::new("/nonexistent/pyembed-shell");
        cmd.arg(command_line);
        cmd
    }
}

#[tokio::test]
async fn test_spawn_failure_is_logged_and_returned() {
    let platform = Platform::with_shell(Box::new(MissingShell));
    let (ctx, mut rx) = context();
    let cancel = CancellationToken::new();

    let outcome = platform.run_command(&ctx, "anything", None, &cancel).await;

    match &outcome {
        CommandOutcome::SpawnFailed { message } => {
            assert_eq!(message, "command not found: missing");
        }
        other => panic!("expected spawn failure, got {other:?}"),
    }
    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, ProcessEvent::Failed { command, .. } if command == "anything")));
}

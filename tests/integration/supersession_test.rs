//! Supersession Tests
//!
//! Starting a new run must close every previous subscription before the new
//! one opens, mark the superseded views terminal without firing their
//! completion callbacks, and keep late state out of the successor's view.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kora_studio::services::engine::PairedRunIds;
use kora_studio::{RunOutcome, ViewerState};

use super::support::{done, stage, ScriptedTransport, StalledTransport};

#[tokio::test]
async fn test_superseded_run_is_terminal_without_callback() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);

    let state = ViewerState::new(Arc::new(StalledTransport));
    let first = state
        .start_run(
            "run-1",
            Some(Box::new(move |_| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .await;
    tokio::task::yield_now().await;

    let second = state.start_run("run-2", None).await;

    let first_view = first.snapshot();
    assert!(first_view.is_terminal());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // The successor starts from a fresh view
    let second_view = second.snapshot();
    assert_eq!(second_view.run_id(), "run-2");
    assert!(second_view.history().is_empty());
}

#[tokio::test]
async fn test_superseded_state_does_not_leak_into_successor() {
    let transport = ScriptedTransport::new(vec![
        ("run-1", vec![stage("IR", 1), stage("DETERMINISTIC", 2), done()]),
        ("run-2", vec![stage("VERIFY", 3), done()]),
    ]);

    let state = ViewerState::new(transport.clone());
    let first = state.start_run("run-1", None).await;
    first.wait().await;

    let second = state.start_run("run-2", None).await;
    assert_eq!(second.wait().await, Some(RunOutcome::Completed));

    let view = second.snapshot();
    assert_eq!(view.history().len(), 1);
    assert_eq!(view.history().last().unwrap().time_ms, 3);
    assert_eq!(transport.open_count(), 2);
}

#[tokio::test]
async fn test_new_single_run_supersedes_comparison_pair() {
    let state = ViewerState::new(Arc::new(StalledTransport));
    let (baseline, warmed) = state
        .start_comparison(PairedRunIds {
            baseline_run_id: "b1".to_string(),
            warmed_run_id: "w1".to_string(),
        })
        .await;
    tokio::task::yield_now().await;

    let _single = state.start_run("run-3", None).await;

    assert!(baseline.snapshot().is_terminal());
    assert!(warmed.snapshot().is_terminal());
}

#[tokio::test]
async fn test_shutdown_all_closes_active_run() {
    let state = ViewerState::new(Arc::new(StalledTransport));
    let handle = state.start_run("run-1", None).await;
    tokio::task::yield_now().await;

    state.shutdown_all().await;
    assert!(handle.snapshot().is_terminal());
}

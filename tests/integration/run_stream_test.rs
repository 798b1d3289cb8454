//! Single-Run Stream Tests
//!
//! Drives one subscription through complete scripted streams and checks the
//! projected view: station routing, history bounding, summary merging,
//! retrieval metrics, and terminal outcomes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kora_studio::{RunOutcome, Station, Subscription};
use kora_studio_core::MAX_RECENT_EVENTS;

use super::support::{done, stage, station, summary, ScriptItem, ScriptedTransport};

#[tokio::test]
async fn test_full_run_projects_every_station() {
    let transport = ScriptedTransport::new(vec![(
        "run-1",
        vec![
            stage("IR", 3),
            stage("DETERMINISTIC", 12),
            stage("SCHEDULER", 1),
            station(r#"{"stage":"ADAPTER","status":"ok","time_ms":412,"skipped":false,"tokens_in":188,"tokens_out":187}"#),
            stage("VERIFY", 9),
            summary(r#"{"ok":true,"total_time_ms":4842,"total_llm_calls":1,"tokens_in":188,"tokens_out":187,"estimated_cost_usd":0.0001404}"#),
            done(),
        ],
    )]);

    let sub = Subscription::spawn(transport, "run-1", None);
    assert_eq!(sub.wait().await, Some(RunOutcome::Completed));

    let view = sub.snapshot();
    assert_eq!(view.total_events(), 5);
    assert_eq!(view.active_station(), Some(Station::Verify));
    assert!(!view.skipped_llm());

    assert!(view.station_metric(Station::Input).is_some());
    assert!(view.station_metric(Station::Deterministic).is_some());
    assert!(view.station_metric(Station::Decision).is_some());
    assert!(view.station_metric(Station::Verify).is_some());
    let adapter = view.station_metric(Station::Adapter).unwrap();
    assert_eq!(adapter.time_ms, 412);
    assert_eq!(adapter.tokens_out, Some(187));

    let report = view.report();
    assert_eq!(report.ok, Some(true));
    assert_eq!(report.estimated_cost_usd, Some(0.0001404));
}

#[tokio::test]
async fn test_unknown_stage_routes_to_decision() {
    let transport = ScriptedTransport::new(vec![(
        "run-1",
        vec![stage("FUTURE_STAGE", 7), done()],
    )]);
    let sub = Subscription::spawn(transport, "run-1", None);
    sub.wait().await;

    let view = sub.snapshot();
    assert_eq!(view.active_station(), Some(Station::Decision));
}

#[tokio::test]
async fn test_history_is_bounded_fifo() {
    let mut script: Vec<ScriptItem> = (0..(MAX_RECENT_EVENTS as u64 + 50))
        .map(|i| stage("VERIFY", i))
        .collect();
    script.push(done());
    let transport = ScriptedTransport::new(vec![("run-1", script)]);

    let sub = Subscription::spawn(transport, "run-1", None);
    sub.wait().await;

    let view = sub.snapshot();
    assert_eq!(view.history().len(), MAX_RECENT_EVENTS);
    assert_eq!(view.total_events(), MAX_RECENT_EVENTS as u64 + 50);
    // Oldest evicted first: the window starts 50 events in
    assert_eq!(view.history().iter().next().unwrap().time_ms, 50);
    assert_eq!(
        view.history().last().unwrap().time_ms,
        MAX_RECENT_EVENTS as u64 + 49
    );
}

#[tokio::test]
async fn test_partial_summaries_merge_across_frames() {
    let transport = ScriptedTransport::new(vec![(
        "run-1",
        vec![
            summary(r#"{"tokens_in":188}"#),
            summary(r#"{"tokens_out":187,"estimated_cost_usd":0.0001}"#),
            summary(r#"{"ok":true}"#),
            done(),
        ],
    )]);
    let sub = Subscription::spawn(transport, "run-1", None);
    sub.wait().await;

    let report = sub.snapshot().report().clone();
    assert_eq!(report.tokens_in, Some(188));
    assert_eq!(report.tokens_out, Some(187));
    assert_eq!(report.estimated_cost_usd, Some(0.0001));
    assert_eq!(report.ok, Some(true));
}

#[tokio::test]
async fn test_retrieval_metrics_over_full_stream() {
    let transport = ScriptedTransport::new(vec![(
        "run-1",
        vec![
            station(r#"{"stage":"SCHEDULER","status":"ok","time_ms":1,"meta":{"gate_retrieval_hit":true,"stop_reason":"accepted_gate_retrieval"}}"#),
            station(r#"{"stage":"SCHEDULER","status":"ok","time_ms":1,"meta":{"gate_retrieval_hit":false}}"#),
            station(r#"{"stage":"ADAPTER","status":"ok","time_ms":400,"meta":{"adapter":"mock:full"}}"#),
            done(),
        ],
    )]);
    let sub = Subscription::spawn(transport, "run-1", None);
    sub.wait().await;

    let metrics = sub.snapshot().retrieval_summary();
    assert_eq!(metrics.retrieval_attempts, 2);
    assert_eq!(metrics.retrieval_hits, 1);
    assert!((metrics.retrieval_hit_rate - 0.5).abs() < 1e-9);
    assert_eq!(metrics.accepted_gate_retrieval_count, 1);
    assert!(metrics.terminal_full);
}

#[tokio::test]
async fn test_warmed_run_skips_adapter() {
    let transport = ScriptedTransport::new(vec![(
        "run-1",
        vec![
            stage("IR", 2),
            station(r#"{"stage":"ADAPTER","status":"ok","time_ms":0,"skipped":true}"#),
            done(),
        ],
    )]);
    let sub = Subscription::spawn(transport, "run-1", None);
    sub.wait().await;

    let view = sub.snapshot();
    assert!(view.skipped_llm());
    assert_eq!(view.active_station(), Some(Station::Output));
}

#[tokio::test]
async fn test_stream_failure_keeps_partial_state() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);

    let transport = ScriptedTransport::new(vec![(
        "run-1",
        vec![stage("IR", 2), stage("DETERMINISTIC", 5), ScriptItem::Fail("connection reset")],
    )]);
    let sub = Subscription::spawn(
        transport,
        "run-1",
        Some(Box::new(move |outcome| {
            assert_eq!(outcome, RunOutcome::TransportError);
            calls_clone.fetch_add(1, Ordering::SeqCst);
        })),
    );

    assert_eq!(sub.wait().await, Some(RunOutcome::TransportError));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(sub.snapshot().history().len(), 2);
}

#[tokio::test]
async fn test_malformed_frames_do_not_derail_run() {
    let transport = ScriptedTransport::new(vec![(
        "run-1",
        vec![
            station("{ garbage"),
            ScriptItem::Record("heartbeat", "{}".to_string()),
            stage("VERIFY", 4),
            done(),
        ],
    )]);
    let sub = Subscription::spawn(transport, "run-1", None);
    assert_eq!(sub.wait().await, Some(RunOutcome::Completed));
    assert_eq!(sub.snapshot().history().len(), 1);
}

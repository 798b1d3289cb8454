//! Paired-Run Reconciliation Tests
//!
//! A paired demo runs the same prompt twice, cold baseline then warmed, and
//! the pair is only done when both subscriptions reach terminal. The warmed
//! run's stream carries the ADAPTER skip, and the engine's history listing
//! yields the cost comparison.

use std::sync::Arc;

use kora_studio::services::engine::PairedRunIds;
use kora_studio::{RunHistoryCache, RunHistoryItem, RunMode, RunReport, ViewerState};

use super::support::{done, stage, station, summary, ScriptItem, ScriptedTransport};

fn baseline_script() -> Vec<ScriptItem> {
    vec![
        stage("IR", 2),
        station(r#"{"stage":"ADAPTER","status":"ok","time_ms":420,"skipped":false,"tokens_out":187,"meta":{"adapter":"mock:full"}}"#),
        summary(r#"{"ok":true,"total_time_ms":450,"estimated_cost_usd":0.02,"tokens_out":187}"#),
        done(),
    ]
}

fn warmed_script() -> Vec<ScriptItem> {
    vec![
        stage("IR", 2),
        station(r#"{"stage":"ADAPTER","status":"ok","time_ms":1,"skipped":true,"meta":{"stop_reason":"accepted_gate_retrieval","gate_retrieval_hit":true}}"#),
        summary(r#"{"ok":true,"total_time_ms":30,"estimated_cost_usd":0.01,"tokens_out":187}"#),
        done(),
    ]
}

#[tokio::test]
async fn test_pair_completes_when_both_runs_finish() {
    let transport = ScriptedTransport::new(vec![
        ("b1", baseline_script()),
        ("w1", warmed_script()),
    ]);
    let state = ViewerState::new(transport.clone());

    let (baseline, warmed) = state
        .start_comparison(PairedRunIds {
            baseline_run_id: "b1".to_string(),
            warmed_run_id: "w1".to_string(),
        })
        .await;
    state.wait_for_comparison().await;

    let baseline_view = baseline.snapshot();
    let warmed_view = warmed.snapshot();
    assert!(baseline_view.is_terminal());
    assert!(warmed_view.is_terminal());

    assert!(!baseline_view.skipped_llm());
    assert!(warmed_view.skipped_llm());
    assert_eq!(baseline_view.report().estimated_cost_usd, Some(0.02));
    assert_eq!(warmed_view.report().estimated_cost_usd, Some(0.01));

    let warmed_metrics = warmed_view.retrieval_summary();
    assert_eq!(warmed_metrics.retrieval_hits, 1);
    assert_eq!(warmed_metrics.accepted_gate_retrieval_count, 1);

    assert_eq!(transport.open_count(), 2);
}

#[tokio::test]
async fn test_pair_completes_even_when_one_run_fails() {
    let transport = ScriptedTransport::new(vec![
        ("b1", baseline_script()),
        ("w1", vec![stage("IR", 2), ScriptItem::Fail("connection reset")]),
    ]);
    let state = ViewerState::new(transport);

    let (baseline, warmed) = state
        .start_comparison(PairedRunIds {
            baseline_run_id: "b1".to_string(),
            warmed_run_id: "w1".to_string(),
        })
        .await;
    state.wait_for_comparison().await;

    assert!(baseline.snapshot().is_terminal());
    assert!(warmed.snapshot().is_terminal());
}

#[test]
fn test_history_listing_produces_comparison() {
    fn entry(run_id: &str, mode: RunMode, cost: f64, time_ms: u64) -> RunHistoryItem {
        RunHistoryItem {
            run_id: run_id.to_string(),
            prompt: "same prompt".to_string(),
            mode,
            summary: RunReport {
                ok: Some(true),
                estimated_cost_usd: Some(cost),
                tokens_out: Some(187),
                total_time_ms: Some(time_ms),
                ..Default::default()
            },
        }
    }

    // Most recent first, as the listing endpoint returns it
    let cache = RunHistoryCache::from_items(vec![
        entry("w1", RunMode::Kora, 0.01, 30),
        entry("b1", RunMode::Direct, 0.02, 450),
    ]);

    let pair = cache.latest_pair().expect("pair should be comparable");
    assert_eq!(pair.direct_cost_usd, 0.02);
    assert_eq!(pair.kora_cost_usd, 0.01);
    assert!((pair.savings_percent - 50.0).abs() < 1e-9);
    assert_eq!(pair.tokens_out_diff, 0);
    assert_eq!(pair.latency_diff_ms, 420);
}

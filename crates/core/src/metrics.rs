//! Retrieval Metrics
//!
//! Derived statistics over a run's event history: retrieval hit rate, gate
//! acceptance counts, and terminal-path classification. Recomputed on demand
//! as a pure function of the bounded history; never incrementally maintained
//! and never cached.

use serde::{Deserialize, Serialize};

use crate::history::{ProjectedStationEvent, RunEventHistory};

/// Derived retrieval statistics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSummary {
    /// Hits over attempts; 0 when there were no attempts.
    pub retrieval_hit_rate: f64,
    pub retrieval_attempts: u64,
    pub retrieval_hits: u64,
    pub accepted_gate_retrieval_count: u64,
    pub accepted_gate_verified_count: u64,
    /// Whether the run's terminal path used a ":full" adapter variant.
    pub terminal_full: bool,
    /// `terminal_full` surfaced as a 0/1 rate for uniform tabular display.
    pub terminal_full_rate: f64,
}

/// An event counts as a retrieval attempt when the gate recorded a hit
/// verdict at all, or when its stop reason shows the gate was consulted.
fn is_retrieval_attempt(event: &ProjectedStationEvent) -> bool {
    let Some(meta) = &event.meta else {
        return false;
    };
    if meta.gate_retrieval_hit.is_some() {
        return true;
    }
    meta.stop_reason
        .as_deref()
        .is_some_and(|r| r.starts_with("accepted_gate_") || r.starts_with("escalate_gate_"))
}

fn stop_reason_is(event: &ProjectedStationEvent, reason: &str) -> bool {
    event
        .meta
        .as_ref()
        .and_then(|m| m.stop_reason.as_deref())
        .is_some_and(|r| r == reason)
}

fn adapter_is_full(event: &ProjectedStationEvent) -> bool {
    event
        .meta
        .as_ref()
        .and_then(|m| m.adapter.as_deref())
        .is_some_and(|a| a.ends_with(":full"))
}

/// Computes the retrieval summary for the current history window.
///
/// Pure and side-effect free; counts are order-independent, and the
/// terminal-path classification checks both "any event" and "the most recent
/// event". The second check is redundant when every event carries `meta`, but
/// it is kept as a fallback for streams where only the last event does.
pub fn summarize(history: &RunEventHistory) -> RetrievalSummary {
    let mut attempts: u64 = 0;
    let mut hits: u64 = 0;
    let mut accepted_retrieval: u64 = 0;
    let mut accepted_verified: u64 = 0;
    let mut any_full = false;

    for event in history.iter() {
        if is_retrieval_attempt(event) {
            attempts += 1;
            if event
                .meta
                .as_ref()
                .is_some_and(|m| m.gate_retrieval_hit == Some(true))
            {
                hits += 1;
            }
        }
        if stop_reason_is(event, "accepted_gate_retrieval") {
            accepted_retrieval += 1;
        }
        if stop_reason_is(event, "accepted_gate_verified") {
            accepted_verified += 1;
        }
        if adapter_is_full(event) {
            any_full = true;
        }
    }

    let last_full = history.last().is_some_and(adapter_is_full);
    let terminal_full = any_full || last_full;

    RetrievalSummary {
        retrieval_hit_rate: if attempts > 0 {
            hits as f64 / attempts as f64
        } else {
            0.0
        },
        retrieval_attempts: attempts,
        retrieval_hits: hits,
        accepted_gate_retrieval_count: accepted_retrieval,
        accepted_gate_verified_count: accepted_verified,
        terminal_full,
        terminal_full_rate: if terminal_full { 1.0 } else { 0.0 },
    }
}

//! Run History Cache & Pairwise Comparison
//!
//! Read-only snapshot of past run summaries, most recent first as returned by
//! the backend engine's listing. A before/after comparison is defined only
//! when the two most recent entries share a prompt and differ in execution
//! mode; otherwise no comparison is produced — absence, not an error.

use serde::{Deserialize, Serialize};

use crate::report::RunReport;

/// Bound on retained history entries. The engine's listing is short demo
/// data and the comparison only ever inspects the first two entries.
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// Execution mode a run was submitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Straight adapter call, no gating.
    Direct,
    /// The full gated pipeline.
    Kora,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Direct => f.write_str("direct"),
            RunMode::Kora => f.write_str("kora"),
        }
    }
}

/// One entry of the engine's run-history listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHistoryItem {
    pub run_id: String,
    pub prompt: String,
    pub mode: RunMode,
    pub summary: RunReport,
}

/// Direct-vs-kora deltas for the latest comparable pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseComparison {
    pub direct_cost_usd: f64,
    pub kora_cost_usd: f64,
    /// `(direct - kora) / direct * 100`, or 0 when the direct cost is zero.
    pub savings_percent: f64,
    /// Direct minus kora output tokens.
    pub tokens_out_diff: i64,
    /// Direct minus kora total time.
    pub latency_diff_ms: i64,
}

/// In-memory snapshot of the engine's run-history listing.
#[derive(Debug, Clone, Default)]
pub struct RunHistoryCache {
    items: Vec<RunHistoryItem>,
}

impl RunHistoryCache {
    /// Builds a snapshot from the listing, keeping at most
    /// [`MAX_HISTORY_ENTRIES`] of the most recent entries.
    pub fn from_items(mut items: Vec<RunHistoryItem>) -> Self {
        items.truncate(MAX_HISTORY_ENTRIES);
        Self { items }
    }

    pub fn items(&self) -> &[RunHistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Compares the two most recent runs when they form a valid pair: same
    /// prompt, different mode. Returns `None` otherwise.
    pub fn latest_pair(&self) -> Option<PairwiseComparison> {
        let [first, second] = [self.items.first()?, self.items.get(1)?];
        if first.prompt != second.prompt || first.mode == second.mode {
            return None;
        }

        let (direct, kora) = if first.mode == RunMode::Direct {
            (first, second)
        } else {
            (second, first)
        };

        let direct_cost = direct.summary.estimated_cost_usd.unwrap_or(0.0);
        let kora_cost = kora.summary.estimated_cost_usd.unwrap_or(0.0);
        let savings_percent = if direct_cost > 0.0 {
            (direct_cost - kora_cost) / direct_cost * 100.0
        } else {
            0.0
        };

        let tokens_out_diff = direct.summary.tokens_out.unwrap_or(0) as i64
            - kora.summary.tokens_out.unwrap_or(0) as i64;
        let latency_diff_ms = direct.summary.total_time_ms.unwrap_or(0) as i64
            - kora.summary.total_time_ms.unwrap_or(0) as i64;

        Some(PairwiseComparison {
            direct_cost_usd: direct_cost,
            kora_cost_usd: kora_cost,
            savings_percent,
            tokens_out_diff,
            latency_diff_ms,
        })
    }
}

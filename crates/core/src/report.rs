//! Run Report
//!
//! Terminal aggregate for a run. Summary fields arrive incrementally in some
//! flows (multiple `summary` frames, each carrying a subset), so every field
//! is optional and later frames merge over earlier ones instead of replacing
//! the whole report. The same shape is returned by the engine's run-history
//! listing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Merged terminal report for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Whether the run completed successfully (engine's verdict, not the
    /// stream's).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_llm_calls: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_out: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_usd: Option<f64>,

    /// Per-stage event counts as reported by the engine's telemetry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_counts: Option<BTreeMap<String, u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_ok: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_fail: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_skipped: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_breaches: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_required: Option<u64>,
}

impl RunReport {
    /// Merges `incoming` over `self`: fields present in `incoming` overwrite,
    /// absent fields leave existing values untouched.
    pub fn merge(&mut self, incoming: RunReport) {
        macro_rules! take_if_some {
            ($($field:ident),+ $(,)?) => {
                $(if incoming.$field.is_some() {
                    self.$field = incoming.$field;
                })+
            };
        }
        take_if_some!(
            ok,
            total_time_ms,
            total_llm_calls,
            tokens_in,
            tokens_out,
            estimated_cost_usd,
            stage_counts,
            events_ok,
            events_fail,
            events_skipped,
            budget_breaches,
            escalation_required,
        );
    }

    /// True when no field has been set yet.
    pub fn is_empty(&self) -> bool {
        *self == RunReport::default()
    }
}

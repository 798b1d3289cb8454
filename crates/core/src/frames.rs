//! Run Stream Wire Frames
//!
//! Payload types for the backend engine's per-run SSE stream and the parser
//! that turns a named SSE record into a typed frame. The stream carries three
//! named events:
//!
//! ```text
//! event: station
//! data: {"stage":"ADAPTER","status":"ok","time_ms":412,...}
//!
//! event: summary
//! data: {"ok":true,"total_time_ms":4842,...}
//!
//! event: done
//! data: {"ok":true}
//! ```
//!
//! The event format is owned by the backend; partial corruption must degrade
//! gracefully, so parse failures are surfaced as values for the caller to
//! discard rather than escalate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::RunReport;

/// Pipeline-internal decision signals attached to a station event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationMeta {
    /// Why the stage stopped (e.g. "accepted_gate_retrieval").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// Whether the retrieval gate hit. Presence of the boolean marks the
    /// event as a retrieval attempt regardless of its value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_retrieval_hit: Option<bool>,
    /// Retrieval strategy used by the gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_retrieval_strategy: Option<String>,
    /// Whether the verifier gate accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_verifier_ok: Option<bool>,
    /// Adapter variant that handled the stage (e.g. "openai:full").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
    /// Model identifier reported by the adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// One stage-completion notification from the backend engine.
///
/// Immutable once received; not persisted beyond the viewer's in-memory
/// window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationEvent {
    /// Backend-internal stage name (e.g. "DETERMINISTIC", "ADAPTER").
    pub stage: String,
    /// Stage status string (e.g. "ok", "fail").
    pub status: String,
    /// Stage wall time in milliseconds.
    pub time_ms: u64,
    /// Whether the stage was skipped (LLM bypass on ADAPTER).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_out: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<StationMeta>,
}

/// A typed frame from a run's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStreamFrame {
    /// A stage-completion notification.
    Station(StationEvent),
    /// A (possibly partial) terminal summary. Later summary frames merge
    /// over earlier ones.
    Summary(RunReport),
    /// End of stream. Any payload is ignored.
    Done,
}

/// Errors from decoding a single named SSE record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Invalid JSON or missing required fields in the payload.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Event name not part of the run stream contract.
    #[error("Unsupported event: {0}")]
    Unsupported(String),
}

impl RunStreamFrame {
    /// Decodes a named SSE record into a frame.
    ///
    /// Subscribers discard `Err` values frame-by-frame; a malformed frame
    /// must never abort the subscription.
    pub fn parse(event: &str, data: &str) -> Result<RunStreamFrame, FrameError> {
        match event {
            "station" => {
                let payload: StationEvent = serde_json::from_str(data)
                    .map_err(|e| FrameError::Parse(e.to_string()))?;
                Ok(RunStreamFrame::Station(payload))
            }
            "summary" => {
                let payload: RunReport = serde_json::from_str(data)
                    .map_err(|e| FrameError::Parse(e.to_string()))?;
                Ok(RunStreamFrame::Summary(payload))
            }
            // "done" carries an informational payload in some flows;
            // lifecycle-wise only the event name matters.
            "done" => Ok(RunStreamFrame::Done),
            other => Err(FrameError::Unsupported(other.to_string())),
        }
    }
}

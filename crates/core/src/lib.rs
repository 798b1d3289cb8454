//! KORA Studio Core
//!
//! Pure data model for the KORA Studio execution viewer: the fixed pipeline
//! station vocabulary, the backend engine's wire frames, bounded event
//! history, and the metrics derived from it. This crate has zero dependencies
//! on application-level code (HTTP client, async runtime, CLI).
//!
//! ## Module Organization
//!
//! - `station` - Six-station pipeline model and stage projection
//! - `frames` - SSE wire payloads (`StationEvent`, `RunStreamFrame`)
//! - `report` - Merged terminal run report (`RunReport`)
//! - `history` - Bounded rolling event history (`RunEventHistory`)
//! - `metrics` - Derived retrieval summary (`RetrievalSummary`)
//! - `comparison` - Run history snapshot and pairwise comparison
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/thiserror** - keeps build times minimal
//! 2. **Total projections** - stage vocabulary skew must never crash the viewer
//! 3. **Recompute, don't cache** - derived metrics are pure functions of
//!    bounded history, cheap enough to recompute on every request

pub mod station;
pub mod frames;
pub mod report;
pub mod history;
pub mod metrics;
pub mod comparison;

// ── Station Model ──────────────────────────────────────────────────────
pub use station::Station;

// ── Wire Frames ────────────────────────────────────────────────────────
pub use frames::{FrameError, RunStreamFrame, StationEvent, StationMeta};

// ── Run Report ─────────────────────────────────────────────────────────
pub use report::RunReport;

// ── Event History ──────────────────────────────────────────────────────
pub use history::{ProjectedStationEvent, RunEventHistory, MAX_RECENT_EVENTS};

// ── Derived Metrics ────────────────────────────────────────────────────
pub use metrics::{summarize, RetrievalSummary};

// ── History Cache & Comparison ─────────────────────────────────────────
pub use comparison::{PairwiseComparison, RunHistoryCache, RunHistoryItem, RunMode};

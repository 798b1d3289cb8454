//! Kora Studio - Live Run Viewer Library
//!
//! Client-side library for watching kora pipeline runs live. It includes:
//! - An HTTP/SSE client for the backend engine's run API
//! - Per-run subscriptions that project the event stream into view state
//! - Paired baseline/warmed run reconciliation
//! - Retrieval metrics and run-history comparison (via `kora_studio_core`)

pub mod services;
pub mod state;
pub mod utils;

// Re-export the engine client surface
pub use services::engine::{EngineClient, EngineClientConfig, PairedRunIds, RunRequest};
// Re-export the viewer surface
pub use services::viewer::{
    ComparisonRun, CompletionBarrier, RunHandle, RunOutcome, RunPhase, RunTransport, RunView,
    StationMetric, Subscription,
};
pub use state::ViewerState;
pub use utils::error::{AppError, AppResult};

// Re-export the projection core
pub use kora_studio_core::{
    summarize, PairwiseComparison, RetrievalSummary, RunEventHistory, RunHistoryCache,
    RunHistoryItem, RunMode, RunReport, RunStreamFrame, Station, StationEvent,
};

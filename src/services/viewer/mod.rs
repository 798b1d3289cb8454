//! Live Run Viewer
//!
//! Projection and lifecycle layer between the engine's SSE streams and the
//! frontends:
//! - `view` - per-run projection state (phase, history, station metrics)
//! - `subscriber` - one background reader task per run id
//! - `reconciler` - completion barrier and paired baseline/warmed runs

pub mod reconciler;
pub mod subscriber;
pub mod view;

pub use reconciler::{ComparisonRun, CompletionBarrier};
pub use subscriber::{RunHandle, RunTransport, Subscription, TerminalCallback};
pub use view::{RunOutcome, RunPhase, RunView, StationMetric};

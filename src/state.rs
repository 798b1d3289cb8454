//! Viewer State
//!
//! Owns the active subscription slots: one slot for a single run and one for
//! a paired baseline/warmed comparison. Starting anything new closes every
//! occupied slot first, so at most one live transport family exists at a
//! time and a superseded run's late frames have nowhere to land.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::services::engine::PairedRunIds;
use crate::services::viewer::reconciler::ComparisonRun;
use crate::services::viewer::subscriber::{
    RunHandle, RunTransport, Subscription, TerminalCallback,
};

#[derive(Default)]
struct Slots {
    single: Option<Subscription>,
    comparison: Option<ComparisonRun>,
}

impl Slots {
    async fn close_all(&mut self) {
        if let Some(subscription) = self.single.take() {
            tracing::debug!(run_id = %subscription.run_id(), "superseding single run");
            subscription.shutdown().await;
        }
        if let Some(pair) = self.comparison.take() {
            tracing::debug!("superseding comparison pair");
            pair.shutdown().await;
        }
    }
}

/// Shared application state for the viewer.
pub struct ViewerState {
    transport: Arc<dyn RunTransport>,
    slots: Mutex<Slots>,
}

impl ViewerState {
    pub fn new(transport: Arc<dyn RunTransport>) -> Self {
        Self {
            transport,
            slots: Mutex::new(Slots::default()),
        }
    }

    /// Subscribes to a single run, superseding any active runs.
    pub async fn start_run(
        &self,
        run_id: impl Into<String>,
        on_terminal: Option<TerminalCallback>,
    ) -> RunHandle {
        let mut slots = self.slots.lock().await;
        slots.close_all().await;

        let subscription =
            Subscription::spawn(Arc::clone(&self.transport), run_id, on_terminal);
        let handle = subscription.handle();
        slots.single = Some(subscription);
        handle
    }

    /// Subscribes to a paired demo's two runs, superseding any active runs.
    pub async fn start_comparison(&self, ids: PairedRunIds) -> (RunHandle, RunHandle) {
        let mut slots = self.slots.lock().await;
        slots.close_all().await;

        let pair = ComparisonRun::start(Arc::clone(&self.transport), ids);
        let handles = (pair.baseline().handle(), pair.warmed().handle());
        slots.comparison = Some(pair);
        handles
    }

    /// Waits for the active comparison pair to finish both runs. No-op when
    /// no pair is active.
    pub async fn wait_for_comparison(&self) {
        let barrier_wait = {
            let slots = self.slots.lock().await;
            slots.comparison.as_ref().map(|pair| {
                let pair_done = pair.is_complete();
                (pair_done, pair.baseline().handle(), pair.warmed().handle())
            })
        };
        // The slot lock is not held across the waits so a superseding start
        // is never blocked behind a slow pair.
        if let Some((done, baseline, warmed)) = barrier_wait {
            if !done {
                baseline.wait().await;
                warmed.wait().await;
            }
        }
    }

    /// Closes every active subscription.
    pub async fn shutdown_all(&self) {
        self.slots.lock().await.close_all().await;
    }
}

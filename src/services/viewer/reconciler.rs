//! Paired-Run Reconciler
//!
//! Coordinates the baseline/warmed subscription pair of a paired demo. Each
//! subscription reports completion (success or transport error) into a shared
//! `CompletionBarrier`; once the barrier drains, the pair as a whole is done
//! and its views can be compared.

use std::sync::Arc;

use tokio::sync::watch;

use super::subscriber::{RunTransport, Subscription};
use super::view::RunView;
use crate::services::engine::PairedRunIds;

/// Countdown of outstanding run completions.
///
/// Decrements are saturating: a spurious extra arrival can never push the
/// counter negative or un-complete the barrier.
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    remaining: Arc<watch::Sender<usize>>,
    rx: watch::Receiver<usize>,
}

impl CompletionBarrier {
    pub fn new(parties: usize) -> Self {
        let (tx, rx) = watch::channel(parties);
        Self {
            remaining: Arc::new(tx),
            rx,
        }
    }

    /// Records one completion.
    pub fn arrive(&self) {
        self.remaining.send_modify(|n| *n = n.saturating_sub(1));
    }

    pub fn remaining(&self) -> usize {
        *self.rx.borrow()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Waits until every party has arrived.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        // wait_for errs only when the sender is gone, in which case the
        // counter can no longer move and the current value is final.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

/// The two live subscriptions of one paired demo.
pub struct ComparisonRun {
    baseline: Subscription,
    warmed: Subscription,
    barrier: CompletionBarrier,
}

impl ComparisonRun {
    /// Subscribes to both runs of a paired demo over the same transport.
    pub fn start(transport: Arc<dyn RunTransport>, ids: PairedRunIds) -> Self {
        let barrier = CompletionBarrier::new(2);

        let baseline_barrier = barrier.clone();
        let baseline = Subscription::spawn(
            Arc::clone(&transport),
            ids.baseline_run_id,
            Some(Box::new(move |_| baseline_barrier.arrive())),
        );

        let warmed_barrier = barrier.clone();
        let warmed = Subscription::spawn(
            transport,
            ids.warmed_run_id,
            Some(Box::new(move |_| warmed_barrier.arrive())),
        );

        Self {
            baseline,
            warmed,
            barrier,
        }
    }

    pub fn baseline(&self) -> &Subscription {
        &self.baseline
    }

    pub fn warmed(&self) -> &Subscription {
        &self.warmed
    }

    pub fn baseline_view(&self) -> RunView {
        self.baseline.snapshot()
    }

    pub fn warmed_view(&self) -> RunView {
        self.warmed.snapshot()
    }

    pub fn is_complete(&self) -> bool {
        self.barrier.is_complete()
    }

    /// Waits until both runs have reached a terminal frame or transport
    /// error.
    pub async fn all_done(&self) {
        self.barrier.wait().await;
    }

    /// Cancels both subscriptions. Cancelled runs never arrive at the
    /// barrier, so a superseded pair stays incomplete by design of the
    /// callback wiring.
    pub async fn shutdown(self) {
        self.baseline.shutdown().await;
        self.warmed.shutdown().await;
    }
}

//! Run Subscriber
//!
//! Owns the background task that reads one run's SSE stream and folds its
//! frames into a `RunView`. Lifecycle rules:
//! - A `done` frame or a transport error is terminal; the completion callback
//!   fires exactly once, on the first terminal transition only.
//! - Cancellation (supersession or shutdown) marks the view terminal without
//!   firing the callback.
//! - Stream end without a `done` frame is a transport error.
//! - Malformed frames are logged and dropped; the stream keeps going.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use kora_studio_core::{FrameError, RunStreamFrame};

use super::view::{RunOutcome, RunView};
use crate::services::engine::SseRecord;
use crate::utils::error::{AppError, AppResult};

/// Boxed stream of raw SSE records as produced by a transport.
pub type RawRecordStream = Pin<Box<dyn Stream<Item = Result<SseRecord, AppError>> + Send>>;

/// Callback invoked exactly once when a run reaches `done` or a transport
/// error. Cancellation does not fire it.
pub type TerminalCallback = Box<dyn FnOnce(RunOutcome) + Send>;

/// Source of per-run SSE record streams.
#[async_trait]
pub trait RunTransport: Send + Sync {
    async fn open(&self, run_id: &str) -> AppResult<RawRecordStream>;
}

/// A live subscription to one run's event stream.
///
/// Dropping the subscription cancels its reader task. Each subscription owns
/// its view exclusively, so frames from a cancelled stream can never reach a
/// successor's state.
pub struct Subscription {
    run_id: String,
    view: Arc<Mutex<RunView>>,
    outcome_rx: watch::Receiver<Option<RunOutcome>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Read-only handle to a subscription's view, cheap to clone and safe to
/// hold after the subscription itself is gone.
#[derive(Clone)]
pub struct RunHandle {
    view: Arc<Mutex<RunView>>,
    outcome_rx: watch::Receiver<Option<RunOutcome>>,
}

fn lock_view(view: &Mutex<RunView>) -> MutexGuard<'_, RunView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Subscription {
    /// Spawns the reader task for `run_id` against the given transport.
    pub fn spawn(
        transport: Arc<dyn RunTransport>,
        run_id: impl Into<String>,
        on_terminal: Option<TerminalCallback>,
    ) -> Self {
        let run_id = run_id.into();
        let view = Arc::new(Mutex::new(RunView::new(run_id.clone())));
        let (outcome_tx, outcome_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(reader_task(
            transport,
            run_id.clone(),
            Arc::clone(&view),
            outcome_tx,
            cancel.clone(),
            on_terminal,
        ));

        Self {
            run_id,
            view,
            outcome_rx,
            cancel,
            task,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Snapshot of the current view state.
    pub fn snapshot(&self) -> RunView {
        lock_view(&self.view).clone()
    }

    pub fn handle(&self) -> RunHandle {
        RunHandle {
            view: Arc::clone(&self.view),
            outcome_rx: self.outcome_rx.clone(),
        }
    }

    /// Waits for the run to complete or fail. Returns None when the
    /// subscription is cancelled before a terminal frame arrives.
    pub async fn wait(&self) -> Option<RunOutcome> {
        wait_for_outcome(self.outcome_rx.clone()).await
    }

    /// Cancels the reader task and waits for it to unwind. The view is
    /// marked terminal but the completion callback does not fire.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        let _ = (&mut self.task).await;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl RunHandle {
    pub fn snapshot(&self) -> RunView {
        lock_view(&self.view).clone()
    }

    pub async fn wait(&self) -> Option<RunOutcome> {
        wait_for_outcome(self.outcome_rx.clone()).await
    }
}

async fn wait_for_outcome(
    mut rx: watch::Receiver<Option<RunOutcome>>,
) -> Option<RunOutcome> {
    loop {
        if let Some(outcome) = *rx.borrow() {
            return Some(outcome);
        }
        if rx.changed().await.is_err() {
            // Sender dropped without a terminal frame (cancelled)
            return *rx.borrow();
        }
    }
}

async fn reader_task(
    transport: Arc<dyn RunTransport>,
    run_id: String,
    view: Arc<Mutex<RunView>>,
    outcome_tx: watch::Sender<Option<RunOutcome>>,
    cancel: CancellationToken,
    on_terminal: Option<TerminalCallback>,
) {
    lock_view(&view).mark_connecting();

    let mut stream = tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!(run_id = %run_id, "run cancelled before stream opened");
            lock_view(&view).finish(RunOutcome::TransportError);
            return;
        }
        opened = transport.open(&run_id) => match opened {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(run_id = %run_id, error = %e, "failed to open run stream");
                finish(&view, &outcome_tx, on_terminal, RunOutcome::TransportError);
                return;
            }
        },
    };

    let mut on_terminal = on_terminal;
    loop {
        let item = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(run_id = %run_id, "run cancelled mid-stream");
                // Cancellation is terminal but never fires the callback
                lock_view(&view).finish(RunOutcome::TransportError);
                return;
            }
            item = stream.next() => item,
        };

        match item {
            Some(Ok(record)) => {
                lock_view(&view).mark_streaming();
                match RunStreamFrame::parse(&record.event, &record.data) {
                    Ok(RunStreamFrame::Done) => {
                        tracing::debug!(run_id = %run_id, "run completed");
                        finish(&view, &outcome_tx, on_terminal.take(), RunOutcome::Completed);
                        return;
                    }
                    Ok(frame) => lock_view(&view).apply_frame(frame),
                    Err(FrameError::Unsupported(event)) => {
                        tracing::debug!(run_id = %run_id, event = %event, "skipping unsupported event");
                    }
                    Err(e) => {
                        tracing::debug!(run_id = %run_id, error = %e, "dropping malformed frame");
                    }
                }
            }
            Some(Err(e)) => {
                tracing::warn!(run_id = %run_id, error = %e, "run stream failed");
                finish(&view, &outcome_tx, on_terminal.take(), RunOutcome::TransportError);
                return;
            }
            None => {
                // EOF without a done frame
                tracing::warn!(run_id = %run_id, "run stream ended without done frame");
                finish(&view, &outcome_tx, on_terminal.take(), RunOutcome::TransportError);
                return;
            }
        }
    }
}

fn finish(
    view: &Mutex<RunView>,
    outcome_tx: &watch::Sender<Option<RunOutcome>>,
    on_terminal: Option<TerminalCallback>,
    outcome: RunOutcome,
) {
    // finish() returning false means another path already terminated the run;
    // the callback must not fire a second time.
    if lock_view(view).finish(outcome) {
        let _ = outcome_tx.send(Some(outcome));
        if let Some(callback) = on_terminal {
            callback(outcome);
        }
    }
}

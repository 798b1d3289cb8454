//! Run View
//!
//! Per-subscription projection state: the lifecycle phase, bounded event
//! history, latest-per-station metric snapshot, merged report, and the
//! LLM-skip flag used to reroute the visual path. One `RunView` is owned
//! exclusively by one subscription; a superseding run gets a fresh view, so
//! late frames from a closed transport can never touch a successor's state.

use std::collections::HashMap;

use serde::Serialize;

use kora_studio_core::{
    summarize, ProjectedStationEvent, RetrievalSummary, RunEventHistory, RunReport,
    RunStreamFrame, Station, StationEvent,
};

/// How a subscription reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// The stream delivered its `done` frame.
    Completed,
    /// The transport failed or closed without a `done` frame.
    TransportError,
}

/// Lifecycle phase of one run subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Connecting,
    Streaming,
    Terminal(RunOutcome),
}

/// Latest metric snapshot for one station (overwritten per event, not
/// merged).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMetric {
    pub status: String,
    pub time_ms: u64,
    pub skipped: Option<bool>,
    pub tokens_in: Option<u64>,
    pub tokens_out: Option<u64>,
}

/// Live projection state for one run.
#[derive(Debug, Clone)]
pub struct RunView {
    run_id: String,
    phase: RunPhase,
    history: RunEventHistory,
    station_metrics: HashMap<Station, StationMetric>,
    report: RunReport,
    skipped_llm: bool,
    active_station: Option<Station>,
    total_events: u64,
}

impl RunView {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            phase: RunPhase::Idle,
            history: RunEventHistory::new(),
            station_metrics: HashMap::new(),
            report: RunReport::default(),
            skipped_llm: false,
            active_station: None,
            total_events: 0,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, RunPhase::Terminal(_))
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.phase {
            RunPhase::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn history(&self) -> &RunEventHistory {
        &self.history
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Whether an ADAPTER stage reported `skipped == true` during this run.
    pub fn skipped_llm(&self) -> bool {
        self.skipped_llm
    }

    /// Station of the most recently projected event.
    pub fn active_station(&self) -> Option<Station> {
        self.active_station
    }

    /// Total station events seen, including ones already evicted from the
    /// bounded window.
    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    pub fn station_metric(&self, station: Station) -> Option<&StationMetric> {
        self.station_metrics.get(&station)
    }

    pub fn station_metrics(&self) -> &HashMap<Station, StationMetric> {
        &self.station_metrics
    }

    /// Recomputes the retrieval summary over the current history window.
    pub fn retrieval_summary(&self) -> RetrievalSummary {
        summarize(&self.history)
    }

    pub(crate) fn mark_connecting(&mut self) {
        if self.phase == RunPhase::Idle {
            self.phase = RunPhase::Connecting;
        }
    }

    pub(crate) fn mark_streaming(&mut self) {
        if self.phase == RunPhase::Connecting {
            self.phase = RunPhase::Streaming;
        }
    }

    /// Applies a parsed stream frame. `Done` is a lifecycle event handled by
    /// the subscription, not the view.
    pub(crate) fn apply_frame(&mut self, frame: RunStreamFrame) {
        match frame {
            RunStreamFrame::Station(event) => self.apply_station(event),
            RunStreamFrame::Summary(report) => self.merge_summary(report),
            RunStreamFrame::Done => {}
        }
    }

    pub(crate) fn apply_station(&mut self, event: StationEvent) {
        if event.stage.eq_ignore_ascii_case("ADAPTER") && event.skipped == Some(true) {
            self.skipped_llm = true;
        }

        let projected = ProjectedStationEvent::project(event);
        self.station_metrics.insert(
            projected.station,
            StationMetric {
                status: projected.status.clone(),
                time_ms: projected.time_ms,
                skipped: projected.skipped,
                tokens_in: projected.tokens_in,
                tokens_out: projected.tokens_out,
            },
        );
        self.active_station = Some(projected.station);
        self.total_events += 1;
        self.history.push(projected);
    }

    pub(crate) fn merge_summary(&mut self, incoming: RunReport) {
        self.report.merge(incoming);
    }

    /// Transitions to terminal. Returns false when already terminal, so the
    /// first transition wins even if `done` and a transport error race.
    pub(crate) fn finish(&mut self, outcome: RunOutcome) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.phase = RunPhase::Terminal(outcome);
        true
    }
}

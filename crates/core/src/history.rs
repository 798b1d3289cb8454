//! Bounded Run Event History
//!
//! Each subscription accumulates projected station events in a sliding
//! window over the most recent [`MAX_RECENT_EVENTS`] entries. Eviction is
//! FIFO: reaching the bound is normal operation, not an error, and the
//! relative order of retained events is preserved.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::frames::{StationEvent, StationMeta};
use crate::station::Station;

/// Capacity of the rolling event window.
pub const MAX_RECENT_EVENTS: usize = 200;

/// A station event plus its derived pipeline station.
///
/// Created and owned exclusively by one run's subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedStationEvent {
    /// Derived pipeline station.
    pub station: Station,
    /// Raw backend stage name.
    pub stage: String,
    pub status: String,
    pub time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_out: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<StationMeta>,
}

impl ProjectedStationEvent {
    /// Projects a raw station event onto the pipeline model.
    pub fn project(event: StationEvent) -> Self {
        let skipped = event.skipped.unwrap_or(false);
        Self {
            station: Station::project(&event.stage, skipped),
            stage: event.stage,
            status: event.status,
            time_ms: event.time_ms,
            skipped: event.skipped,
            tokens_in: event.tokens_in,
            tokens_out: event.tokens_out,
            meta: event.meta,
        }
    }
}

/// Ordered rolling window of projected station events.
#[derive(Debug, Clone, Default)]
pub struct RunEventHistory {
    events: VecDeque<ProjectedStationEvent>,
}

impl RunEventHistory {
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(MAX_RECENT_EVENTS),
        }
    }

    /// Appends an event, evicting the oldest entry once the window is full.
    pub fn push(&mut self, event: ProjectedStationEvent) {
        if self.events.len() == MAX_RECENT_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Oldest-to-newest iteration over the retained window.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectedStationEvent> {
        self.events.iter()
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<&ProjectedStationEvent> {
        self.events.back()
    }

    /// The `n` most recent events, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ProjectedStationEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip)
    }
}

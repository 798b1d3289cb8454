//! Pipeline Station Model
//!
//! The backend engine's internal stage vocabulary is richer than the viewer's
//! fixed six-station pipeline. This module defines the station set and the
//! total projection from reported stage names onto it.

use serde::{Deserialize, Serialize};

/// One of the six fixed visual-pipeline stations.
///
/// Stage events from the backend are projected onto this set; the order of
/// `Station::ALL` is the order stations appear along the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Station {
    Input,
    Deterministic,
    Decision,
    Adapter,
    Verify,
    Output,
}

impl Station {
    /// All stations in pipeline order.
    pub const ALL: [Station; 6] = [
        Station::Input,
        Station::Deterministic,
        Station::Decision,
        Station::Adapter,
        Station::Verify,
        Station::Output,
    ];

    /// Display label, matching the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Station::Input => "Input",
            Station::Deterministic => "Deterministic",
            Station::Decision => "Decision",
            Station::Adapter => "Adapter",
            Station::Verify => "Verify",
            Station::Output => "Output",
        }
    }

    /// Position along the pipeline (0-based).
    pub fn index(&self) -> usize {
        Station::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    /// Projects a backend-reported stage name plus its skip flag onto a
    /// station. Case-insensitive on `stage`.
    ///
    /// This is a total function: unknown stage names map to `Decision` so a
    /// backend running a newer stage vocabulary degrades gracefully instead
    /// of crashing the view. A skipped ADAPTER stage means the LLM call was
    /// bypassed and the run went straight to output.
    pub fn project(stage: &str, skipped: bool) -> Station {
        match stage.to_uppercase().as_str() {
            "DETERMINISTIC" => Station::Deterministic,
            "ADAPTER" if skipped => Station::Output,
            "ADAPTER" => Station::Adapter,
            "VERIFY" => Station::Verify,
            "BUDGET" => Station::Verify,
            "IR" => Station::Input,
            "SCHEDULER" => Station::Decision,
            _ => Station::Decision,
        }
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

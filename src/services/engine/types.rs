//! Engine Wire Types
//!
//! Request/response bodies for the backend engine's submission and listing
//! endpoints. Response ids are deserialized as optionals so a malformed
//! response fails fast with a submission error instead of a parse panic.

use serde::{Deserialize, Serialize};

use kora_studio_core::RunMode;

/// Body of `POST /api/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// The prompt to execute.
    pub prompt: String,
    /// Execution mode.
    pub mode: RunMode,
    /// Adapter name (e.g. "mock", "openai").
    pub adapter: String,
}

impl RunRequest {
    /// Creates a request with the default "mock" adapter.
    pub fn new(prompt: impl Into<String>, mode: RunMode) -> Self {
        Self {
            prompt: prompt.into(),
            mode,
            adapter: "mock".to_string(),
        }
    }

    pub fn with_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = adapter.into();
        self
    }
}

/// Response of `POST /api/run`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSubmission {
    #[serde(default)]
    pub run_id: Option<String>,
}

/// Response of `POST /api/paired_demo`.
#[derive(Debug, Clone, Deserialize)]
pub struct PairedDemoSubmission {
    #[serde(default)]
    pub baseline_run_id: Option<String>,
    #[serde(default)]
    pub warmed_run_id: Option<String>,
}

/// Run identifiers for a paired baseline/warmed comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedRunIds {
    pub baseline_run_id: String,
    pub warmed_run_id: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub ok: bool,
}

//! Engine Client
//!
//! HTTP client for the backend engine: run submission, paired-demo
//! submission, run-history listing, health probe, and per-run SSE event
//! streams.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;

use kora_studio_core::RunHistoryItem;

use super::sse::parse_sse_records;
use super::types::{
    HealthStatus, PairedDemoSubmission, PairedRunIds, RunRequest, RunSubmission,
};
use crate::services::viewer::subscriber::{RawRecordStream, RunTransport};
use crate::utils::error::{AppError, AppResult};

/// Default request timeout for non-streaming calls, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default engine address for the local scaffold.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Configuration for the engine client.
#[derive(Debug, Clone)]
pub struct EngineClientConfig {
    /// Base URL of the backend engine.
    pub base_url: String,
    /// Timeout for submission/listing requests. Never applied to the SSE
    /// stream, which is open-ended by design.
    pub timeout: Duration,
}

impl Default for EngineClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// HTTP client for the backend engine's run API.
#[derive(Debug, Clone)]
pub struct EngineClient {
    client: reqwest::Client,
    config: EngineClientConfig,
}

impl EngineClient {
    /// Creates a client with default configuration.
    pub fn new() -> AppResult<Self> {
        Self::with_config(EngineClientConfig::default())
    }

    /// Creates a client with the given configuration.
    ///
    /// The underlying HTTP client carries no global timeout so long-lived
    /// event streams are not cut off; the configured timeout is applied
    /// per-request to the non-streaming endpoints.
    pub fn with_config(config: EngineClientConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Wraps an existing reqwest client. Useful for tests or callers that
    /// control TLS/proxy settings.
    pub fn with_reqwest_client(client: reqwest::Client, config: EngineClientConfig) -> Self {
        Self { client, config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Http { status, body });
        }
        Ok(response)
    }

    /// Submits a run and returns its id.
    ///
    /// Fails fast when the engine rejects the request or the response lacks
    /// a run id; no subscription is created in that case.
    pub async fn submit_run(&self, request: &RunRequest) -> AppResult<String> {
        let response = self
            .client
            .post(self.endpoint("/api/run"))
            .timeout(self.config.timeout)
            .json(request)
            .send()
            .await?;
        let submission: RunSubmission = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::submission(format!("Failed to parse run response: {}", e)))?;

        match submission.run_id {
            Some(run_id) if !run_id.is_empty() => Ok(run_id),
            _ => Err(AppError::submission("missing run_id in response")),
        }
    }

    /// Submits a paired baseline/warmed demo and returns both run ids.
    pub async fn submit_paired_demo(&self) -> AppResult<PairedRunIds> {
        let response = self
            .client
            .post(self.endpoint("/api/paired_demo"))
            .timeout(self.config.timeout)
            .send()
            .await?;
        let submission: PairedDemoSubmission = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| {
                AppError::submission(format!("Failed to parse paired demo response: {}", e))
            })?;

        match (submission.baseline_run_id, submission.warmed_run_id) {
            (Some(baseline_run_id), Some(warmed_run_id))
                if !baseline_run_id.is_empty() && !warmed_run_id.is_empty() =>
            {
                Ok(PairedRunIds {
                    baseline_run_id,
                    warmed_run_id,
                })
            }
            _ => Err(AppError::submission("missing run ids in paired demo response")),
        }
    }

    /// Fetches the run-history listing, most recent first.
    pub async fn run_history(&self) -> AppResult<Vec<RunHistoryItem>> {
        let response = self
            .client
            .get(self.endpoint("/api/run_history"))
            .timeout(self.config.timeout)
            .send()
            .await?;
        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::network(format!("Failed to parse run history: {}", e)))
    }

    /// Probes the engine's health endpoint.
    pub async fn health(&self) -> AppResult<bool> {
        let response = self
            .client
            .get(self.endpoint("/health"))
            .timeout(self.config.timeout)
            .send()
            .await?;
        let health: HealthStatus = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::network(format!("Failed to parse health response: {}", e)))?;
        Ok(health.ok)
    }

    /// Opens the SSE event stream for one run id.
    pub async fn open_run_stream(&self, run_id: &str) -> AppResult<RawRecordStream> {
        let response = self
            .client
            .get(self.endpoint("/api/sse_run"))
            .query(&[("run_id", run_id)])
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let record_stream = parse_sse_records(response.bytes_stream());
        Ok(record_stream.boxed())
    }
}

#[async_trait]
impl RunTransport for EngineClient {
    async fn open(&self, run_id: &str) -> AppResult<RawRecordStream> {
        self.open_run_stream(run_id).await
    }
}

//! Backend Engine Client
//!
//! HTTP + SSE access to the backend engine's run API:
//! - `client` - submission, listing, health, and stream opening
//! - `sse` - named SSE record parsing over a byte stream
//! - `types` - submission request/response wire types

pub mod client;
pub mod sse;
pub mod types;

pub use client::{EngineClient, EngineClientConfig};
pub use sse::SseRecord;
pub use types::{PairedRunIds, RunRequest};

//! Service Layer
//!
//! - `engine` - HTTP/SSE client for the backend engine
//! - `viewer` - live run projection, subscriptions, paired-run reconciliation

pub mod engine;
pub mod viewer;

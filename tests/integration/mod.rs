//! Integration Tests Module
//!
//! End-to-end tests for the run viewer over scripted transports:
//! - Full single-run streams (projection, summary merging, metrics)
//! - Supersession and slot management
//! - Paired baseline/warmed runs and completion reconciliation

// Shared scripted transport and frame builders
mod support;

// Single-run stream lifecycle tests
mod run_stream_test;

// Supersession and close-before-replace tests
mod supersession_test;

// Paired-run reconciliation tests
mod paired_run_test;

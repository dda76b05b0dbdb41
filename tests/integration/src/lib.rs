//! Integration tests for the GridWatch telemetry pipeline
//!
//! This test suite validates:
//! - The full message path: raw payload -> decode -> store -> snapshot
//! - Concurrency behavior of the store under a live writer
//! - Aggregation over snapshots joined with the facility catalog
//! - Connection state observability through the watch channel

#[cfg(test)]
mod concurrency_tests;

#[cfg(test)]
mod pipeline_tests;

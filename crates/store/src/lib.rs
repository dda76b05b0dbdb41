//! In-memory telemetry store for GridWatch.
//!
//! Holds the latest reading per facility behind a single mutex and hands out
//! consistent, independent snapshots to any number of readers. Aggregation
//! (fleet totals, per-fuel breakdown) works on snapshots only, never on the
//! live store.

pub mod store;
pub mod summary;

pub use store::{Snapshot, TelemetryStore};
pub use summary::{fuel_breakdown, FleetSummary, FuelBucket};

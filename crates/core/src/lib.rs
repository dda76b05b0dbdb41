//! Core functionality for the GridWatch facility monitoring system.
//!
//! This crate provides the fundamental types, configuration, and utilities
//! used across the GridWatch ecosystem.

pub mod catalog;
pub mod config;
pub mod fuel;
pub mod logging;
pub mod types;

pub use catalog::{CatalogError, FacilityCatalog, FacilityInfo};
pub use config::{BrokerConfig, NodeConfig, ReportConfig, RetryConfig};
pub use fuel::{infer_fuel_type, FuelType, INFERENCE_RULES};
pub use types::{ConnectionState, Reading};

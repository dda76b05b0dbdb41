//! Shared telemetry types
//!
//! This module defines the reading record carried from the message bus into
//! the telemetry store, plus the adapter connection state observable by the
//! presentation layer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latest telemetry sample recorded for one facility.
///
/// A reading is replaced wholesale on each update (last-write-wins); the
/// numeric fields are always non-negative, with 0.0 standing in for values
/// the source omitted or mangled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    /// Stable facility code, the store key
    pub facility_id: String,
    /// Power output in megawatts (>= 0)
    pub power_mw: f64,
    /// Emissions in tonnes of CO2-equivalent (>= 0)
    pub emissions_tco2e: f64,
    /// Source-reported event timestamp, or the ingestion time when absent
    pub event_time: String,
    /// Source-reported hour bucket, carried through verbatim
    pub hour: Option<String>,
    /// Wall-clock time the adapter constructed this reading
    pub received_at: DateTime<Utc>,
}

impl Reading {
    /// Age of this reading relative to `now`, for staleness checks.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.received_at
    }
}

/// Connection state of the ingestion adapter.
///
/// Owned by the adapter and published through a watch channel; external
/// observers only ever read it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to the broker
    Disconnected,
    /// Connection attempt in flight
    Connecting,
    /// TCP + MQTT handshake complete, subscription pending
    Connected,
    /// Subscription acknowledged, messages flowing
    Subscribed,
    /// Retry budget exhausted, adapter gave up
    Failed {
        /// Last connection error observed before giving up
        reason: String,
    },
}

impl ConnectionState {
    /// Whether the broker session is established (subscription may still be
    /// pending).
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Subscribed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Subscribed => write!(f, "subscribed"),
            ConnectionState::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

//! Wire message decoding and normalization
//!
//! Inbound messages are JSON objects with a required `facility_code` and a
//! handful of optional fields. Numeric fields degrade rather than fail: a
//! missing, null, non-numeric, negative, or non-finite value becomes 0.0.
//! Only a missing facility code or an unparseable payload drops the whole
//! message.

use chrono::{DateTime, SecondsFormat, Utc};
use gridwatch_core::Reading;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Reasons a message is dropped before reaching the store.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not a parseable JSON object
    #[error("payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    /// Message carries no facility identifier
    #[error("message has no facility_code")]
    MissingFacilityCode,
}

/// Raw wire schema, exactly as published on the telemetry topic.
#[derive(Debug, Deserialize)]
struct WireMessage {
    facility_code: Option<String>,
    #[serde(default)]
    power_mw: Option<Value>,
    #[serde(default)]
    emissions_tco2e: Option<Value>,
    #[serde(default)]
    event_timestamp: Option<String>,
    #[serde(default)]
    hour: Option<String>,
}

/// Decode one payload into a [`Reading`] stamped with `received_at`.
///
/// `event_time` falls back to `received_at` (RFC 3339) when the source
/// reported no timestamp.
pub fn decode_reading(payload: &[u8], received_at: DateTime<Utc>) -> Result<Reading, DecodeError> {
    let message: WireMessage = serde_json::from_slice(payload)?;

    let facility_id = message
        .facility_code
        .ok_or(DecodeError::MissingFacilityCode)?;

    let event_time = message
        .event_timestamp
        .unwrap_or_else(|| received_at.to_rfc3339_opts(SecondsFormat::Secs, true));

    Ok(Reading {
        facility_id,
        power_mw: coerce_non_negative(message.power_mw.as_ref()),
        emissions_tco2e: coerce_non_negative(message.emissions_tco2e.as_ref()),
        event_time,
        hour: message.hour,
        received_at,
    })
}

/// Coerce an optional JSON value to a non-negative finite float.
///
/// Accepts numbers and numeric strings; everything else, including negative
/// and non-finite values, degrades to 0.0. Never errors.
fn coerce_non_negative(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

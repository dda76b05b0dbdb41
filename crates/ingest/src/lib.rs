//! Telemetry ingestion for GridWatch.
//!
//! Bridges an MQTT telemetry topic to the telemetry store: decodes and
//! normalizes each inbound message, applies it to the store, and tracks
//! connection health with explicit reconnect backoff. Malformed messages are
//! absorbed and logged; they never stop the stream.

pub mod adapter;
pub mod backoff;
pub mod decode;

pub use adapter::{IngestError, IngestionAdapter};
pub use backoff::Backoff;
pub use decode::{decode_reading, DecodeError};

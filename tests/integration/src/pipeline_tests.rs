//! End-to-end pipeline tests
//!
//! Drives the ingestion adapter's message pipeline directly (no broker) and
//! checks what snapshot consumers observe on the other side.

use gridwatch_core::{BrokerConfig, ConnectionState, FacilityCatalog, FacilityInfo, FuelType, RetryConfig};
use gridwatch_ingest::IngestionAdapter;
use gridwatch_store::{fuel_breakdown, FleetSummary, TelemetryStore};
use std::sync::Arc;

fn pipeline() -> (IngestionAdapter, Arc<TelemetryStore>) {
    let _ = tracing_subscriber::fmt::try_init();
    let store = Arc::new(TelemetryStore::new());
    let adapter = IngestionAdapter::new(
        BrokerConfig::default(),
        RetryConfig::default(),
        store.clone(),
    );
    (adapter, store)
}

#[test]
fn test_valid_message_lands_in_snapshot() {
    let (adapter, store) = pipeline();

    adapter.ingest_payload(
        br#"{
            "facility_code": "BOCORWF1",
            "power_mw": 42.5,
            "emissions_tco2e": 0.1,
            "event_timestamp": "2024-05-01T10:00:00",
            "hour": "2024-05-01T10"
        }"#,
    );

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    let entry = snapshot.get("BOCORWF1").unwrap();
    assert_eq!(entry.power_mw, 42.5);
    assert_eq!(entry.emissions_tco2e, 0.1);
    assert_eq!(entry.event_time, "2024-05-01T10:00:00");
    assert_eq!(entry.hour.as_deref(), Some("2024-05-01T10"));
}

#[test]
fn test_unidentified_and_malformed_messages_change_nothing() {
    let (adapter, store) = pipeline();

    adapter.ingest_payload(br#"{"facility_code": "KEEP1", "power_mw": 5.0}"#);
    let before = store.snapshot();

    // no facility_code
    adapter.ingest_payload(br#"{"power_mw": 100.0, "emissions_tco2e": 9.0}"#);
    // not JSON
    adapter.ingest_payload(b"\xff\xfe garbage");
    // JSON, wrong shape
    adapter.ingest_payload(br#"["a", "list"]"#);
    adapter.ingest_payload(br#""just a string""#);

    let after = store.snapshot();
    assert_eq!(after.len(), before.len());
    assert_eq!(
        after.get("KEEP1").unwrap().power_mw,
        before.get("KEEP1").unwrap().power_mw
    );
}

// Step through the documented replacement sequence: a later message replaces
// the whole record, with omitted numerics defaulting to zero.
#[test]
fn test_last_write_wins_whole_record_replace() {
    let (adapter, store) = pipeline();

    adapter.ingest_payload(br#"{"facility_code": "A1", "power_mw": 12.5, "emissions_tco2e": 3.0}"#);
    adapter.ingest_payload(br#"{"facility_code": "A1", "power_mw": 15.0}"#);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    let entry = snapshot.get("A1").unwrap();
    assert_eq!(entry.power_mw, 15.0);
    assert_eq!(entry.emissions_tco2e, 0.0);
}

#[test]
fn test_summary_and_breakdown_over_ingested_fleet() {
    let (adapter, store) = pipeline();

    adapter.ingest_payload(br#"{"facility_code": "GULLRWF2", "power_mw": 120.0, "emissions_tco2e": 0.0}"#);
    adapter.ingest_payload(br#"{"facility_code": "BAYSW1", "power_mw": 500.0, "emissions_tco2e": 450.0}"#);
    adapter.ingest_payload(br#"{"facility_code": "NYNGAN1", "power_mw": 80.0, "emissions_tco2e": 0.0}"#);

    let snapshot = store.snapshot();
    let summary = FleetSummary::from_snapshot(&snapshot);
    assert_eq!(summary.facilities, 3);
    assert_eq!(summary.total_power_mw, 700.0);
    assert_eq!(summary.total_emissions_tco2e, 450.0);

    let mut catalog = FacilityCatalog::new();
    catalog.insert(
        "GULLRWF2",
        FacilityInfo {
            name: "Gullen Range Wind Farm".to_string(),
            lat: Some(-34.6),
            lng: Some(149.5),
            region: Some("NSW1".to_string()),
            fuel_type: None, // inferred from the "WF" code token
        },
    );
    catalog.insert(
        "BAYSW1",
        FacilityInfo {
            name: "Bayswater Power Station".to_string(),
            lat: Some(-32.4),
            lng: Some(150.9),
            region: Some("NSW1".to_string()),
            fuel_type: Some("Coal".to_string()),
        },
    );

    let breakdown = fuel_breakdown(&snapshot, &catalog);
    assert_eq!(breakdown.len(), 3);
    assert_eq!(breakdown[0].fuel, FuelType::Coal);
    assert_eq!(breakdown[0].total_power_mw, 500.0);
    assert_eq!(breakdown[1].fuel, FuelType::Wind);
    // NYNGAN1 is not in the catalog, so it buckets as Unknown
    assert_eq!(breakdown[2].fuel, FuelType::Unknown);
    assert_eq!(breakdown[2].total_power_mw, 80.0);
}

#[test]
fn test_connection_state_watch_starts_disconnected() {
    let (adapter, _store) = pipeline();
    let state = adapter.watch_state();
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);
}

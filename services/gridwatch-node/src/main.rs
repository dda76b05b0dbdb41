//! GridWatch node: composition root for the telemetry pipeline.
//!
//! Wires the telemetry store to the MQTT ingestion adapter and periodically
//! logs a fleet status report (the consumer seat a dashboard would occupy).

use anyhow::Context;
use gridwatch_core::{logging, ConnectionState, FacilityCatalog, NodeConfig, ReportConfig};
use gridwatch_ingest::IngestionAdapter;
use gridwatch_store::{fuel_breakdown, FleetSummary, TelemetryStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = match parse_config_path(&std::env::args().collect::<Vec<_>>())? {
        Some(path) => NodeConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            warn!("no --config given, using built-in defaults");
            NodeConfig::default_config()
        }
    };

    let catalog = match FacilityCatalog::from_file(&config.catalog_path) {
        Ok(catalog) => {
            info!(
                path = %config.catalog_path.display(),
                facilities = catalog.len(),
                "facility catalog loaded"
            );
            catalog
        }
        Err(err) => {
            warn!(
                path = %config.catalog_path.display(),
                error = %err,
                "facility catalog unavailable, fuel breakdown will show Unknown"
            );
            FacilityCatalog::new()
        }
    };

    let store = Arc::new(TelemetryStore::new());
    let adapter = IngestionAdapter::new(config.broker.clone(), config.retry.clone(), store.clone());
    let state_rx = adapter.watch_state();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ingest_task = tokio::spawn(adapter.run(shutdown_rx));

    let mut report = tokio::time::interval(Duration::from_secs(config.report.interval_secs));
    report.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            _ = report.tick() => {
                report_fleet_status(&store, &catalog, &state_rx, &config.report);
            }
        }
    }

    let _ = shutdown_tx.send(true);
    match ingest_task.await? {
        Ok(()) => info!("ingestion adapter stopped"),
        Err(err) => warn!(error = %err, "ingestion adapter terminated with error"),
    }
    Ok(())
}

fn report_fleet_status(
    store: &TelemetryStore,
    catalog: &FacilityCatalog,
    state_rx: &watch::Receiver<ConnectionState>,
    report: &ReportConfig,
) {
    let snapshot = store.snapshot();
    let summary = FleetSummary::from_snapshot(&snapshot);
    let stale = snapshot.stale_count(chrono::Duration::seconds(report.stale_after_secs as i64));
    let state = state_rx.borrow().clone();

    info!(
        connection = %state,
        facilities = summary.facilities,
        total_power_mw = summary.total_power_mw,
        total_emissions_tco2e = summary.total_emissions_tco2e,
        mean_power_mw = summary.mean_power_mw,
        emission_intensity = summary.emission_intensity,
        stale,
        "fleet status"
    );

    for bucket in fuel_breakdown(&snapshot, catalog) {
        info!(
            fuel = %bucket.fuel,
            facilities = bucket.facilities,
            total_power_mw = bucket.total_power_mw,
            total_emissions_tco2e = bucket.total_emissions_tco2e,
            "fuel breakdown"
        );
    }
}

fn parse_config_path(args: &[String]) -> anyhow::Result<Option<PathBuf>> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            return match args_iter.next() {
                Some(path) => Ok(Some(PathBuf::from(path))),
                None => Err(anyhow::anyhow!("--config was provided without a path")),
            };
        }
    }
    Ok(None)
}

//! Fleet aggregation over snapshots
//!
//! Pure derivations for the dashboard's metrics row and fuel-type breakdown
//! table. Everything here takes a [`Snapshot`]; nothing touches the live
//! store.

use crate::store::Snapshot;
use gridwatch_core::{FacilityCatalog, FuelType};
use serde::Serialize;
use std::collections::HashMap;

/// Fleet-wide totals derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    /// Facilities with at least one reading
    pub facilities: usize,
    /// Sum of power output in MW
    pub total_power_mw: f64,
    /// Sum of emissions in tCO2e
    pub total_emissions_tco2e: f64,
    /// Mean power output in MW (0 when the snapshot is empty)
    pub mean_power_mw: f64,
    /// Emissions per MW; `None` when total power is zero
    pub emission_intensity: Option<f64>,
}

impl FleetSummary {
    /// Compute totals for a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let facilities = snapshot.len();
        let mut total_power_mw = 0.0;
        let mut total_emissions_tco2e = 0.0;

        for (_, reading) in snapshot.iter() {
            total_power_mw += reading.power_mw;
            total_emissions_tco2e += reading.emissions_tco2e;
        }

        let mean_power_mw = if facilities > 0 {
            total_power_mw / facilities as f64
        } else {
            0.0
        };
        let emission_intensity = if total_power_mw > 0.0 {
            Some(total_emissions_tco2e / total_power_mw)
        } else {
            None
        };

        Self {
            facilities,
            total_power_mw,
            total_emissions_tco2e,
            mean_power_mw,
            emission_intensity,
        }
    }
}

/// Per-fuel-type aggregation bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelBucket {
    /// Fuel category
    pub fuel: FuelType,
    /// Facilities of this fuel type with a reading
    pub facilities: usize,
    /// Sum of power output in MW
    pub total_power_mw: f64,
    /// Sum of emissions in tCO2e
    pub total_emissions_tco2e: f64,
}

/// Group a snapshot's readings by fuel type, joining against the facility
/// catalog by key. Facilities missing from the catalog land in the
/// [`FuelType::Unknown`] bucket. Buckets come back sorted by total power,
/// descending.
pub fn fuel_breakdown(snapshot: &Snapshot, catalog: &FacilityCatalog) -> Vec<FuelBucket> {
    let mut buckets: HashMap<FuelType, FuelBucket> = HashMap::new();

    for (facility_id, reading) in snapshot.iter() {
        let fuel = catalog.fuel_for(facility_id);
        let bucket = buckets.entry(fuel).or_insert_with(|| FuelBucket {
            fuel,
            facilities: 0,
            total_power_mw: 0.0,
            total_emissions_tco2e: 0.0,
        });
        bucket.facilities += 1;
        bucket.total_power_mw += reading.power_mw;
        bucket.total_emissions_tco2e += reading.emissions_tco2e;
    }

    let mut out: Vec<FuelBucket> = buckets.into_values().collect();
    out.sort_by(|a, b| {
        b.total_power_mw
            .partial_cmp(&a.total_power_mw)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}

//! Static facility metadata catalog
//!
//! The catalog maps facility codes to display metadata (name, coordinates,
//! region, declared fuel). It is owned and loaded by the composition root;
//! the telemetry core only joins against it by key when categorizing. A
//! facility missing from the catalog is not an error — it simply falls under
//! [`FuelType::Unknown`].

use crate::fuel::{infer_fuel_type, FuelType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not valid TOML
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Metadata for one facility.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacilityInfo {
    /// Human-readable facility name
    pub name: String,
    /// Latitude in decimal degrees
    pub lat: Option<f64>,
    /// Longitude in decimal degrees
    pub lng: Option<f64>,
    /// Network region the facility belongs to
    pub region: Option<String>,
    /// Declared fuel technology label, if the source provided one
    pub fuel_type: Option<String>,
}

/// Facility metadata table keyed by facility code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacilityCatalog {
    facilities: HashMap<String, FacilityInfo>,
}

impl FacilityCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a TOML file.
    ///
    /// Expected shape:
    /// ```toml
    /// [facilities.BOCORWF1]
    /// name = "Boco Rock Wind Farm"
    /// lat = -36.94
    /// lng = 149.27
    /// region = "NSW1"
    /// fuel_type = "Wind"
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = toml::from_str(&content)?;
        Ok(catalog)
    }

    /// Look up a facility's metadata.
    pub fn get(&self, facility_id: &str) -> Option<&FacilityInfo> {
        self.facilities.get(facility_id)
    }

    /// Resolve the fuel type for a facility, applying inference when the
    /// declared label is missing or unusable. Facilities absent from the
    /// catalog resolve to [`FuelType::Unknown`].
    pub fn fuel_for(&self, facility_id: &str) -> FuelType {
        match self.facilities.get(facility_id) {
            Some(info) => infer_fuel_type(info.fuel_type.as_deref(), &info.name, facility_id),
            None => FuelType::Unknown,
        }
    }

    /// Number of facilities in the catalog.
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Iterate over all catalog entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FacilityInfo)> {
        self.facilities.iter()
    }

    /// Insert or replace a facility entry.
    pub fn insert(&mut self, facility_id: impl Into<String>, info: FacilityInfo) {
        self.facilities.insert(facility_id.into(), info);
    }
}

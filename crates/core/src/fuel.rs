//! Fuel taxonomy and category inference
//!
//! Facility metadata sometimes arrives without a usable fuel type. This
//! module assigns one from free-text fields (facility name and code) via an
//! ordered substring rule table. The order is load-bearing: a code can match
//! several rules (e.g. a coal plant name containing a "WF" unit code), and
//! the first matching rule always wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fuel technology categories tracked by the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FuelType {
    /// Coal-fired generation
    Coal,
    /// Gas turbines (CCGT/OCGT)
    Gas,
    /// Hydroelectric generation
    Hydro,
    /// Wind farms
    Wind,
    /// Solar / photovoltaic
    Solar,
    /// Battery storage
    Battery,
    /// Biomass generation
    Biomass,
    /// Diesel / distillate generation
    Distillate,
    /// Unclassified
    Unknown,
}

impl FuelType {
    /// Parse a declared fuel label, case-insensitively.
    ///
    /// Returns `None` for labels outside the taxonomy so the caller can fall
    /// back to inference instead of silently misfiling them.
    pub fn from_label(label: &str) -> Option<FuelType> {
        match label.trim().to_ascii_lowercase().as_str() {
            "coal" => Some(FuelType::Coal),
            "gas" => Some(FuelType::Gas),
            "hydro" => Some(FuelType::Hydro),
            "wind" => Some(FuelType::Wind),
            "solar" => Some(FuelType::Solar),
            "battery" => Some(FuelType::Battery),
            "biomass" => Some(FuelType::Biomass),
            "distillate" => Some(FuelType::Distillate),
            _ => None,
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FuelType::Coal => "Coal",
            FuelType::Gas => "Gas",
            FuelType::Hydro => "Hydro",
            FuelType::Wind => "Wind",
            FuelType::Solar => "Solar",
            FuelType::Battery => "Battery",
            FuelType::Biomass => "Biomass",
            FuelType::Distillate => "Distillate",
            FuelType::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// One inference rule: substring tokens checked against the facility name
/// and code (both lowercased).
#[derive(Debug, Clone, Copy)]
pub struct InferenceRule {
    /// Fuel type assigned when this rule matches
    pub fuel: FuelType,
    /// Tokens matched against the facility name
    pub name_tokens: &'static [&'static str],
    /// Tokens matched against the facility code
    pub code_tokens: &'static [&'static str],
}

impl InferenceRule {
    fn matches(&self, name: &str, code: &str) -> bool {
        self.name_tokens.iter().any(|t| name.contains(t))
            || self.code_tokens.iter().any(|t| code.contains(t))
    }
}

/// Ordered inference rules; first match wins.
///
/// The order is a pinned design choice, not an artifact: wind is checked
/// before coal, so a code containing both a wind token and a coal token
/// resolves to wind deterministically.
pub const INFERENCE_RULES: &[InferenceRule] = &[
    InferenceRule {
        fuel: FuelType::Wind,
        name_tokens: &["wind"],
        code_tokens: &["wf", "wind"],
    },
    InferenceRule {
        fuel: FuelType::Solar,
        name_tokens: &["solar", "pv"],
        code_tokens: &["solar"],
    },
    InferenceRule {
        fuel: FuelType::Hydro,
        name_tokens: &["hydro", "water"],
        code_tokens: &["hydro"],
    },
    InferenceRule {
        fuel: FuelType::Coal,
        name_tokens: &["coal"],
        code_tokens: &["coal"],
    },
    InferenceRule {
        fuel: FuelType::Gas,
        name_tokens: &["gas"],
        code_tokens: &["ccgt", "ocgt", "gas"],
    },
    InferenceRule {
        fuel: FuelType::Battery,
        name_tokens: &["battery", "bess"],
        code_tokens: &["batt"],
    },
    InferenceRule {
        fuel: FuelType::Biomass,
        name_tokens: &["biomass"],
        code_tokens: &["bio"],
    },
    InferenceRule {
        fuel: FuelType::Distillate,
        name_tokens: &["diesel", "distillate"],
        code_tokens: &[],
    },
];

/// Resolve a facility's fuel type.
///
/// A declared label wins when it parses into the taxonomy; otherwise the
/// name and code are matched against [`INFERENCE_RULES`] in order, falling
/// back to [`FuelType::Unknown`].
pub fn infer_fuel_type(declared: Option<&str>, name: &str, code: &str) -> FuelType {
    if let Some(label) = declared {
        if !label.trim().is_empty() {
            if let Some(fuel) = FuelType::from_label(label) {
                return fuel;
            }
        }
    }

    let name = name.to_ascii_lowercase();
    let code = code.to_ascii_lowercase();

    INFERENCE_RULES
        .iter()
        .find(|rule| rule.matches(&name, &code))
        .map(|rule| rule.fuel)
        .unwrap_or(FuelType::Unknown)
}

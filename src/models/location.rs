//! Mountain location model and the storage key derived from it

use crate::analysis::Coordinates;
use crate::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One forecast location, as listed in `mountain_locations.json`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MountainLocation {
    /// Location name (peak, hut, valley)
    pub name: String,
    /// Mountain range the location belongs to
    pub mountain_range: String,
    /// Regional grouping used by the website
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Elevation in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl MountainLocation {
    /// Create a location with only the required fields
    #[must_use]
    pub fn new(name: &str, mountain_range: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            mountain_range: mountain_range.to_string(),
            zone: None,
            latitude,
            longitude,
            elevation: None,
            state: None,
        }
    }

    /// Per-location identifier used to key every artifact in a date partition.
    ///
    /// Range: lowercased, spaces to `_`. Name: spaces to `_`, `,()` removed, lowercased.
    #[must_use]
    pub fn base_key(&self) -> String {
        let range = self.mountain_range.replace(' ', "_").to_lowercase();
        let name: String = self
            .name
            .replace(' ', "_")
            .chars()
            .filter(|c| !matches!(c, ',' | '(' | ')'))
            .collect();
        format!("{range}_{}", name.to_lowercase())
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Human-readable one-liner for report headers
    #[must_use]
    pub fn describe(&self) -> String {
        match self.elevation {
            Some(elevation) => format!("{} ({}, {elevation:.0}m)", self.name, self.mountain_range),
            None => format!("{} ({})", self.name, self.mountain_range),
        }
    }
}

/// Load the location list from a JSON file
pub fn load_locations(path: &Path) -> Result<Vec<MountainLocation>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ForecastError::config(format!(
            "Failed to read locations file {}: {e}",
            path.display()
        ))
    })?;
    let locations: Vec<MountainLocation> = serde_json::from_str(&content)?;
    if locations.is_empty() {
        return Err(ForecastError::config(format!(
            "Locations file {} contains no locations",
            path.display()
        )));
    }
    Ok(locations)
}

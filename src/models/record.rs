//! Persisted record shapes
//!
//! Writers always produce the current shapes. Readers accept every shape
//! that has ever been written so older partitions stay analysable.

use crate::models::{EnrichedHourlyPoint, MountainLocation, WindowSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bump when `CachedWeatherData` changes shape; older caches are re-fetched.
pub const CACHE_SCHEMA_VERSION: u32 = 3;

/// One stored hour as read back by the analyzers.
///
/// Every field is optional: each reduction skips hours missing the field
/// it needs, independently of the others.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StoredHour {
    #[serde(default)]
    pub time_local: Option<String>,
    #[serde(default)]
    pub hour: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub temperature_feel: Option<f64>,
    #[serde(default)]
    pub precipitation: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub wind_gusts: Option<f64>,
    #[serde(default)]
    pub wind_direction: Option<f64>,
    #[serde(default)]
    pub weather_code: Option<i64>,
    #[serde(default)]
    pub cloud_cover: Option<f64>,
    #[serde(default)]
    pub cloud_cover_low: Option<f64>,
    #[serde(default)]
    pub cloud_cover_mid: Option<f64>,
    #[serde(default)]
    pub cloud_cover_high: Option<f64>,
}

impl From<&EnrichedHourlyPoint> for StoredHour {
    fn from(enriched: &EnrichedHourlyPoint) -> Self {
        let p = &enriched.point;
        Self {
            time_local: Some(p.time_local.clone()),
            hour: Some(p.hour),
            temperature: Some(p.temperature),
            temperature_feel: Some(enriched.temperature_feel),
            precipitation: Some(p.precipitation),
            wind_speed: Some(p.wind_speed),
            wind_gusts: p.wind_gusts,
            wind_direction: p.wind_direction,
            weather_code: p.weather_code,
            cloud_cover: p.cloud_cover,
            cloud_cover_low: p.cloud_cover_low,
            cloud_cover_mid: p.cloud_cover_mid,
            cloud_cover_high: p.cloud_cover_high,
        }
    }
}

/// A day's hourly file as found on storage: either a bare list of hours
/// (early layout) or an object carrying them under `data`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum DailyRecordFile {
    Bare(Vec<StoredHour>),
    Wrapped { data: Vec<StoredHour> },
}

impl DailyRecordFile {
    #[must_use]
    pub fn hours(&self) -> &[StoredHour] {
        match self {
            Self::Bare(hours) | Self::Wrapped { data: hours } => hours,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hours().is_empty()
    }
}

/// `{base}_hourly_data_full_day.json`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HourlyDataFile {
    /// When the provider was queried (RFC 3339, UTC)
    pub fetched_at: String,
    pub forecast_date: NaiveDate,
    /// Location name
    pub location: String,
    pub data: Vec<EnrichedHourlyPoint>,
}

/// `{base}_weather_data_24h.json`, reused by `--use-cache` runs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedWeatherData {
    pub schema_version: u32,
    pub location_data: MountainLocation,
    pub weather_report_text: String,
    pub weather_summary: WindowSummary,
    pub hourly_points: Vec<EnrichedHourlyPoint>,
    pub fetched_at: String,
}

impl CachedWeatherData {
    /// Decode a cache file, treating any other schema version as stale
    #[must_use]
    pub fn decode_current(bytes: &[u8]) -> Option<Self> {
        #[derive(Deserialize)]
        struct VersionProbe {
            #[serde(default)]
            schema_version: Option<u32>,
        }

        let probe: VersionProbe = serde_json::from_slice(bytes).ok()?;
        if probe.schema_version != Some(CACHE_SCHEMA_VERSION) {
            return None;
        }
        serde_json::from_slice(bytes).ok()
    }
}

/// `forecast_metadata.json`, one per date partition
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastMetadata {
    pub forecast_date: NaiveDate,
    pub generated_at: NaiveDate,
    pub locations_count: usize,
    pub time_window: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_list_shape() {
        let json = r#"[{"hour": 0, "wind_speed": 12.0, "wind_direction": 90.0}]"#;
        let record: DailyRecordFile = serde_json::from_str(json).unwrap();
        assert!(matches!(record, DailyRecordFile::Bare(_)));
        assert_eq!(record.hours()[0].wind_speed, Some(12.0));
        assert_eq!(record.hours()[0].wind_gusts, None);
    }

    #[test]
    fn test_wrapped_shape_ignores_extra_fields() {
        let json = r#"{"fetched_at": "2026-01-27T06:00:00+00:00", "forecast_date": "2026-01-28",
                       "location": "Omu", "data": [{"hour": 5, "temperature": -3.5, "conditions": "fog"}]}"#;
        let record: DailyRecordFile = serde_json::from_str(json).unwrap();
        assert!(matches!(record, DailyRecordFile::Wrapped { .. }));
        assert_eq!(record.hours()[0].temperature, Some(-3.5));
    }

    #[test]
    fn test_empty_bare_list() {
        let record: DailyRecordFile = serde_json::from_str("[]").unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_stale_cache_is_rejected() {
        let old = br#"{"location_data": {}, "weather_summary": {}}"#;
        assert!(CachedWeatherData::decode_current(old).is_none());

        let wrong_version = br#"{"schema_version": 1}"#;
        assert!(CachedWeatherData::decode_current(wrong_version).is_none());

        let garbage = b"not json";
        assert!(CachedWeatherData::decode_current(garbage).is_none());
    }
}

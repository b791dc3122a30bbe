//! Hourly weather points, window summaries and condition text

use crate::analysis::feels_like;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One hour of weather at one location, in the location's local time
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyForecastPoint {
    /// Local timestamp, e.g. `2026-01-27T09:00`
    pub time_local: String,
    /// Hour of day parsed from `time_local` (0-23)
    pub hour: u32,
    /// Temperature in °C
    pub temperature: f64,
    /// Precipitation in mm
    pub precipitation: f64,
    /// Precipitation probability in percent
    pub precipitation_probability: Option<f64>,
    /// Sustained wind speed in km/h
    pub wind_speed: f64,
    /// Wind gusts in km/h
    pub wind_gusts: Option<f64>,
    /// WMO weather code
    pub weather_code: Option<i64>,
    /// Wind direction in degrees (0 = N, 90 = E)
    pub wind_direction: Option<f64>,
    /// Resolved condition text
    pub conditions: String,
    #[serde(default)]
    pub cloud_cover: Option<f64>,
    #[serde(default)]
    pub cloud_cover_low: Option<f64>,
    #[serde(default)]
    pub cloud_cover_mid: Option<f64>,
    #[serde(default)]
    pub cloud_cover_high: Option<f64>,
}

/// An hourly point with its derived feels-like temperature alongside
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EnrichedHourlyPoint {
    #[serde(flatten)]
    pub point: HourlyForecastPoint,
    /// Wind-chill-with-gusts temperature in °C
    pub temperature_feel: f64,
}

impl EnrichedHourlyPoint {
    #[must_use]
    pub fn from_point(point: HourlyForecastPoint) -> Self {
        let temperature_feel =
            feels_like::feels_like(point.temperature, point.wind_speed, point.wind_gusts);
        Self {
            point,
            temperature_feel,
        }
    }
}

/// Units reported by the provider, with the defaults the pipeline assumes
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyUnits {
    pub temperature: String,
    pub precipitation: String,
    pub wind_speed: String,
    pub wind_gusts: String,
}

impl Default for HourlyUnits {
    fn default() -> Self {
        Self {
            temperature: "°C".to_string(),
            precipitation: "mm".to_string(),
            wind_speed: "km/h".to_string(),
            wind_gusts: "km/h".to_string(),
        }
    }
}

impl HourlyUnits {
    /// Pick units out of the provider's `hourly_units` map
    #[must_use]
    pub fn from_provider(units: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let wind_speed = units
            .get("wind_speed_10m")
            .cloned()
            .unwrap_or(defaults.wind_speed);
        Self {
            temperature: units
                .get("temperature_2m")
                .cloned()
                .unwrap_or(defaults.temperature),
            precipitation: units
                .get("precipitation")
                .cloned()
                .unwrap_or(defaults.precipitation),
            wind_gusts: units
                .get("wind_gusts_10m")
                .cloned()
                .unwrap_or_else(|| wind_speed.clone()),
            wind_speed,
        }
    }
}

/// Aggregate over a contiguous hour window of one day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WindowSummary {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub window_start_local: String,
    pub window_end_local: String,

    pub temp_min: f64,
    pub temp_max: f64,
    pub temp_unit: String,

    pub precip_total: f64,
    pub precip_unit: String,
    pub precip_prob_max: Option<f64>,

    pub wind_avg: f64,
    pub wind_max: f64,
    pub gust_max: Option<f64>,
    pub wind_unit: String,
    /// Provider's gust unit, the wind unit when not reported separately
    pub gust_unit: String,
    /// Scalar mean of the present wind directions
    pub dominant_wind_direction: Option<f64>,

    pub dominant_conditions: String,
}

/// WMO weather interpretation codes used by Open-Meteo
#[must_use]
pub fn code_text(code: i64) -> Option<&'static str> {
    let text = match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "fog",
        48 => "depositing rime fog",
        51 => "light drizzle",
        53 => "moderate drizzle",
        55 => "dense drizzle",
        56 => "light freezing drizzle",
        57 => "dense freezing drizzle",
        61 => "light rain",
        63 => "moderate rain",
        65 => "heavy rain",
        66 => "light freezing rain",
        67 => "heavy freezing rain",
        71 => "light snow",
        73 => "moderate snow",
        75 => "heavy snow",
        77 => "snow grains",
        80 => "slight rain showers",
        81 => "moderate rain showers",
        82 => "violent rain showers",
        85 => "slight snow showers",
        86 => "heavy snow showers",
        95 => "thunderstorm",
        96 => "thunderstorm with hail",
        99 => "thunderstorm with heavy hail",
        _ => return None,
    };
    Some(text)
}

/// Condition text for a point; unknown codes never fail
#[must_use]
pub fn describe_code(code: Option<i64>) -> String {
    match code {
        Some(code) => code_text(code).map_or_else(|| format!("weather code {code}"), String::from),
        None => "unknown".to_string(),
    }
}

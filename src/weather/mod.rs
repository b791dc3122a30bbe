//! Forecast fetching: the provider seam and the day-window adapter
//!
//! `ForecastSource` is the only thing that talks to the network. Everything
//! else in this module turns a provider response into typed hourly points.

use crate::analysis::{
    BucketMode, Coordinates, HistoricalWindAnalysis, WindSample, analyze_samples,
    summarize_window,
};
use crate::models::{HourlyForecastPoint, HourlyUnits, WindowSummary, describe_code};
use crate::{ForecastError, Result};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Hourly variables requested for a forecast day
pub const FORECAST_FIELDS: &[&str] = &[
    "temperature_2m",
    "precipitation",
    "precipitation_probability",
    "wind_speed_10m",
    "wind_gusts_10m",
    "weather_code",
    "wind_direction_10m",
    "cloud_cover",
    "cloud_cover_low",
    "cloud_cover_mid",
    "cloud_cover_high",
];

/// Hourly variables requested for live wind history
pub const WIND_FIELDS: &[&str] = &["wind_speed_10m", "wind_gusts_10m", "wind_direction_10m"];

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// One hourly request to the provider, dates inclusive
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub fields: &'static [&'static str],
}

/// Provider response, local to the requested coordinates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub hourly_units: HashMap<String, String>,
    #[serde(default)]
    pub hourly: Option<HourlyData>,
}

/// Parallel hourly series; any series may be missing or shorter than `time`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourlyData {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m", default)]
    pub temperature: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(rename = "wind_speed_10m", default)]
    pub wind_speed: Vec<Option<f64>>,
    #[serde(rename = "wind_gusts_10m", default)]
    pub wind_gusts: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<i64>>,
    #[serde(rename = "wind_direction_10m", default)]
    pub wind_direction: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover_low: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover_mid: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover_high: Vec<Option<f64>>,
}

fn at<T: Copy>(series: &[Option<T>], index: usize) -> Option<T> {
    series.get(index).copied().flatten()
}

/// Source of hourly forecasts
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Fetch hourly series for the request. Network and HTTP status
    /// failures are `Transport`, undecodable bodies `MalformedResponse`.
    async fn fetch_hourly(&self, request: &HourlyRequest) -> Result<ForecastResponse>;
}

/// Inclusive range of hours of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl HourWindow {
    pub const FULL_DAY: HourWindow = HourWindow {
        start_hour: 0,
        end_hour: 23,
    };

    #[must_use]
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    #[must_use]
    pub fn contains(&self, hour: u32) -> bool {
        (self.start_hour..=self.end_hour).contains(&hour)
    }

    #[must_use]
    pub fn is_full_day(&self) -> bool {
        *self == Self::FULL_DAY
    }
}

/// One day's window of points together with its summary
#[derive(Debug, Clone)]
pub struct ForecastWindow {
    pub date: NaiveDate,
    pub window: HourWindow,
    pub units: HourlyUnits,
    pub summary: WindowSummary,
    pub points: Vec<HourlyForecastPoint>,
}

/// Reject bad coordinates or hours before any I/O
pub fn validate_request(coordinates: Coordinates, window: HourWindow) -> Result<()> {
    if !(-90.0..=90.0).contains(&coordinates.latitude) {
        return Err(ForecastError::validation(
            "latitude must be between -90 and 90",
        ));
    }
    if !(-180.0..=180.0).contains(&coordinates.longitude) {
        return Err(ForecastError::validation(
            "longitude must be between -180 and 180",
        ));
    }
    if window.start_hour > 23 || window.end_hour > 23 {
        return Err(ForecastError::validation(
            "start_hour and end_hour must be between 0 and 23",
        ));
    }
    Ok(())
}

fn parse_time(time: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(time, TIME_FORMAT)
        .map_err(|e| ForecastError::malformed(format!("unparseable hourly time '{time}': {e}")))
}

/// Select the points of `date` inside `window` from a provider response.
///
/// Hours without temperature, precipitation or wind speed are dropped;
/// every other missing field stays `None` on the point.
pub fn points_for_day(
    response: &ForecastResponse,
    date: NaiveDate,
    window: HourWindow,
) -> Result<Vec<HourlyForecastPoint>> {
    let hourly = match &response.hourly {
        Some(hourly) if !hourly.time.is_empty() => hourly,
        _ => return Err(ForecastError::NoData),
    };

    let mut points = Vec::new();
    for (i, time) in hourly.time.iter().enumerate() {
        let local = parse_time(time)?;
        if local.date() != date || !window.contains(local.hour()) {
            continue;
        }

        let (Some(temperature), Some(precipitation), Some(wind_speed)) = (
            at(&hourly.temperature, i),
            at(&hourly.precipitation, i),
            at(&hourly.wind_speed, i),
        ) else {
            debug!(time = %time, "Skipping hour without temperature, precipitation or wind");
            continue;
        };

        let weather_code = at(&hourly.weather_code, i);
        points.push(HourlyForecastPoint {
            time_local: time.clone(),
            hour: local.hour(),
            temperature,
            precipitation,
            precipitation_probability: at(&hourly.precipitation_probability, i),
            wind_speed,
            wind_gusts: at(&hourly.wind_gusts, i),
            weather_code,
            wind_direction: at(&hourly.wind_direction, i),
            conditions: describe_code(weather_code),
            cloud_cover: at(&hourly.cloud_cover, i),
            cloud_cover_low: at(&hourly.cloud_cover_low, i),
            cloud_cover_mid: at(&hourly.cloud_cover_mid, i),
            cloud_cover_high: at(&hourly.cloud_cover_high, i),
        });
    }

    if points.is_empty() {
        return Err(ForecastError::NoDataInWindow {
            date,
            start_hour: window.start_hour,
            end_hour: window.end_hour,
        });
    }
    Ok(points)
}

/// `today + day_offset`
pub fn target_date(today: NaiveDate, day_offset: u32) -> Result<NaiveDate> {
    today
        .checked_add_days(Days::new(day_offset.into()))
        .ok_or_else(|| ForecastError::validation(format!("day offset {day_offset} out of range")))
}

/// Fetch one calendar day (1 = tomorrow) at the location and summarise the window
#[instrument(skip(source), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
pub async fn fetch_day_window(
    source: &dyn ForecastSource,
    coordinates: Coordinates,
    window: HourWindow,
    today: NaiveDate,
    day_offset: u32,
) -> Result<ForecastWindow> {
    validate_request(coordinates, window)?;
    let date = target_date(today, day_offset)?;

    let request = HourlyRequest {
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        start_date: date,
        end_date: date,
        fields: FORECAST_FIELDS,
    };
    let response = source.fetch_hourly(&request).await?;

    let points = points_for_day(&response, date, window)?;
    let units = HourlyUnits::from_provider(&response.hourly_units);
    let timezone = response.timezone.as_deref().unwrap_or("unknown");
    let summary = summarize_window(&points, coordinates, timezone, &units)?;

    debug!(points = points.len(), %date, "Fetched forecast window");
    Ok(ForecastWindow {
        date,
        window,
        units,
        summary,
        points,
    })
}

/// Wind samples from a live provider response; hours missing speed or
/// direction are skipped.
pub fn wind_samples(response: &ForecastResponse) -> Result<Vec<WindSample>> {
    let Some(hourly) = &response.hourly else {
        return Ok(Vec::new());
    };

    let mut samples = Vec::new();
    for (i, time) in hourly.time.iter().enumerate() {
        let (Some(speed), Some(direction)) = (at(&hourly.wind_speed, i), at(&hourly.wind_direction, i))
        else {
            continue;
        };
        samples.push(WindSample {
            date: parse_time(time)?.date(),
            speed,
            gust: at(&hourly.wind_gusts, i),
            direction,
        });
    }
    Ok(samples)
}

/// Fetch the `days_back` days before `analysis_date` from the provider and
/// analyse them in `LiveFetch` mode. `Ok(None)` when no hour qualifies.
#[instrument(skip(source), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
pub async fn fetch_live_wind_analysis(
    source: &dyn ForecastSource,
    coordinates: Coordinates,
    analysis_date: NaiveDate,
    days_back: u32,
) -> Result<Option<HistoricalWindAnalysis>> {
    validate_request(coordinates, HourWindow::FULL_DAY)?;
    if days_back == 0 {
        return Err(ForecastError::validation("days_back must be at least 1"));
    }

    let out_of_range = || ForecastError::validation("analysis date out of range");
    let end_date = analysis_date
        .checked_sub_days(Days::new(1))
        .ok_or_else(out_of_range)?;
    let start_date = end_date
        .checked_sub_days(Days::new(u64::from(days_back - 1)))
        .ok_or_else(out_of_range)?;

    let request = HourlyRequest {
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        start_date,
        end_date,
        fields: WIND_FIELDS,
    };
    let response = source.fetch_hourly(&request).await?;
    let samples = wind_samples(&response)?;

    info!(hours = samples.len(), %start_date, %end_date, "Fetched live wind history");
    Ok(analyze_samples(&samples, BucketMode::LiveFetch, days_back))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Answers every request with the same response and records requests
    pub struct StaticSource {
        pub response: Result<ForecastResponse>,
        pub requests: Mutex<Vec<HourlyRequest>>,
    }

    impl StaticSource {
        pub fn new(response: ForecastResponse) -> Self {
            Self {
                response: Ok(response),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: ForecastError) -> Self {
            Self {
                response: Err(error),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ForecastSource for StaticSource {
        async fn fetch_hourly(&self, request: &HourlyRequest) -> Result<ForecastResponse> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.response {
                Ok(response) => Ok(response.clone()),
                Err(e) => Err(ForecastError::transport(e.to_string())),
            }
        }
    }

    /// 24 hours of `date` plus the first hours of the following day
    pub fn day_response(date: NaiveDate, wind_direction: f64, wind_speed: f64) -> ForecastResponse {
        let next = date.succ_opt().unwrap();
        let mut time: Vec<String> = (0..24).map(|h| format!("{date}T{h:02}:00")).collect();
        time.extend((0..3).map(|h| format!("{next}T{h:02}:00")));
        let n = time.len();

        ForecastResponse {
            timezone: Some("Europe/Bucharest".to_string()),
            hourly_units: HashMap::new(),
            hourly: Some(HourlyData {
                time,
                temperature: (0..n).map(|i| Some(-5.0 + i as f64 * 0.5)).collect(),
                precipitation: vec![Some(0.1); n],
                precipitation_probability: vec![None; n],
                wind_speed: vec![Some(wind_speed); n],
                wind_gusts: vec![Some(wind_speed + 10.0); n],
                weather_code: vec![Some(73); n],
                wind_direction: vec![Some(wind_direction); n],
                cloud_cover: vec![Some(90.0); n],
                cloud_cover_low: Vec::new(),
                cloud_cover_mid: Vec::new(),
                cloud_cover_high: Vec::new(),
            }),
        }
    }
}

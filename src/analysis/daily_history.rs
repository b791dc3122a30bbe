//! Multi-day daily history from persisted hourly records

use super::summary::{dominant_code, max_present, mean_present, vector_mean_direction};
use super::round_to;
use crate::models::{DailyRecordFile, StoredHour};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const FOG_CODES: [i64; 2] = [45, 48];
const RIME_FOG_CODE: i64 = 48;
pub const SNOW_CODES: [i64; 6] = [71, 73, 75, 77, 85, 86];
/// Precipitation below this temperature (°C) counts as snow whatever the code
const SNOW_TEMP_THRESHOLD: f64 = 2.0;

/// One calendar day's aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyHistorySummary {
    pub date: NaiveDate,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub temp_feel_min: Option<f64>,
    pub temp_feel_max: Option<f64>,
    pub precip_total: f64,
    pub wind_avg: Option<f64>,
    pub wind_max: Option<f64>,
    pub gust_max: Option<f64>,
    /// Speed-weighted mean direction, whole degrees
    pub wind_direction: Option<f64>,
    pub cloud_avg: Option<f64>,
    pub cloud_low_avg: Option<f64>,
    pub cloud_mid_avg: Option<f64>,
    pub cloud_high_avg: Option<f64>,
    pub fog_hours: u32,
    pub has_rime_fog: bool,
    pub has_snow: bool,
    pub snow_hours: u32,
    pub snow_precip_mm: f64,
    pub dominant_weather_code: Option<i64>,
}

/// Oldest-first sequence of daily summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherHistory {
    pub days_requested: u32,
    pub days_found: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_data: Vec<DailyHistorySummary>,
    pub source: String,
}

fn is_snow_hour(hour: &StoredHour) -> bool {
    let snow_code = hour.weather_code.is_some_and(|c| SNOW_CODES.contains(&c));
    let cold = hour.temperature.is_some_and(|t| t < SNOW_TEMP_THRESHOLD);
    let wet = hour.precipitation.unwrap_or(0.0) > 0.0;
    snow_code || (cold && wet)
}

fn round_opt(value: Option<f64>, decimals: i32) -> Option<f64> {
    value.map(|v| round_to(v, decimals))
}

fn min_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    values.into_iter().flatten().reduce(f64::min)
}

/// Aggregate one day's hours; `None` for an empty day
#[must_use]
pub fn summarize_day(date: NaiveDate, hours: &[StoredHour]) -> Option<DailyHistorySummary> {
    if hours.is_empty() {
        return None;
    }

    let temps = || hours.iter().map(|h| h.temperature);
    let feels = || hours.iter().map(|h| h.temperature_feel.or(h.temperature));
    let winds = || hours.iter().map(|h| h.wind_speed);

    let codes: Vec<i64> = hours.iter().filter_map(|h| h.weather_code).collect();
    let fog_hours = codes.iter().filter(|c| FOG_CODES.contains(c)).count();

    let (snow_hours, snow_precip) = hours
        .iter()
        .filter(|h| is_snow_hour(h))
        .fold((0_u32, 0.0), |(count, precip), h| {
            (count + 1, precip + h.precipitation.unwrap_or(0.0))
        });

    Some(DailyHistorySummary {
        date,
        temp_min: round_opt(min_present(temps()), 1),
        temp_max: round_opt(max_present(temps()), 1),
        temp_feel_min: round_opt(min_present(feels()), 1),
        temp_feel_max: round_opt(max_present(feels()), 1),
        precip_total: round_to(hours.iter().filter_map(|h| h.precipitation).sum::<f64>(), 1),
        wind_avg: round_opt(mean_present(winds()), 1),
        wind_max: round_opt(max_present(winds()), 1),
        gust_max: round_opt(max_present(hours.iter().map(|h| h.wind_gusts)), 1),
        wind_direction: round_opt(
            vector_mean_direction(hours.iter().map(|h| (h.wind_speed, h.wind_direction))),
            0,
        )
        .map(|d| if d >= 360.0 { 0.0 } else { d }),
        cloud_avg: round_opt(mean_present(hours.iter().map(|h| h.cloud_cover)), 0),
        cloud_low_avg: round_opt(mean_present(hours.iter().map(|h| h.cloud_cover_low)), 0),
        cloud_mid_avg: round_opt(mean_present(hours.iter().map(|h| h.cloud_cover_mid)), 0),
        cloud_high_avg: round_opt(mean_present(hours.iter().map(|h| h.cloud_cover_high)), 0),
        fog_hours: u32::try_from(fog_hours).unwrap_or(u32::MAX),
        has_rime_fog: codes.contains(&RIME_FOG_CODE),
        has_snow: snow_hours > 0,
        snow_hours,
        snow_precip_mm: round_to(snow_precip, 1),
        dominant_weather_code: dominant_code(codes.iter().copied()),
    })
}

/// One summary per day that has a non-empty record, oldest first.
/// `None` when no day has data.
#[must_use]
pub fn build_history(
    days: &[(NaiveDate, DailyRecordFile)],
    days_requested: u32,
) -> Option<WeatherHistory> {
    let mut daily_data: Vec<DailyHistorySummary> = days
        .iter()
        .filter_map(|(date, record)| summarize_day(*date, record.hours()))
        .collect();
    daily_data.sort_by_key(|day| day.date);

    let start_date = daily_data.first()?.date;
    let end_date = daily_data.last()?.date;

    Some(WeatherHistory {
        days_requested,
        days_found: daily_data.len(),
        start_date,
        end_date,
        daily_data,
        source: "saved_forecast_data".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn hour(temperature: f64, precipitation: f64, code: i64) -> StoredHour {
        StoredHour {
            temperature: Some(temperature),
            precipitation: Some(precipitation),
            weather_code: Some(code),
            ..StoredHour::default()
        }
    }

    #[test]
    fn test_cold_rain_counts_as_snow() {
        let day = summarize_day(date(10), &[hour(-1.0, 2.0, 61)]).unwrap();
        assert!(day.has_snow);
        assert_eq!(day.snow_hours, 1);
        assert_eq!(day.snow_precip_mm, 2.0);
    }

    #[test]
    fn test_snow_code_or_cold_precip_counts_once() {
        let hours = vec![
            hour(-3.0, 1.2, 73), // both clauses
            hour(4.0, 0.0, 85),  // code only
            hour(1.0, 0.0, 3),   // cold but dry
            hour(6.0, 3.0, 63),  // warm rain
        ];
        let day = summarize_day(date(10), &hours).unwrap();
        assert_eq!(day.snow_hours, 2);
        assert_eq!(day.snow_precip_mm, 1.2);
        assert_eq!(day.precip_total, 4.2);
    }

    #[test]
    fn test_missing_temperature_is_not_cold() {
        let hours = vec![StoredHour {
            precipitation: Some(1.0),
            weather_code: Some(61),
            ..StoredHour::default()
        }];
        let day = summarize_day(date(10), &hours).unwrap();
        assert!(!day.has_snow);
        assert_eq!(day.temp_min, None);
        assert_eq!(day.temp_feel_min, None);
    }

    #[test]
    fn test_fog_and_dominant_code() {
        let hours = vec![
            hour(0.0, 0.0, 45),
            hour(0.0, 0.0, 48),
            hour(0.0, 0.0, 3),
            hour(0.0, 0.0, 45),
            hour(0.0, 0.0, 48),
        ];
        let day = summarize_day(date(10), &hours).unwrap();
        assert_eq!(day.fog_hours, 4);
        assert!(day.has_rime_fog);
        // 45 and 48 tie at two hours each
        assert_eq!(day.dominant_weather_code, Some(48));
    }

    #[test]
    fn test_fields_reduce_independently() {
        let hours = vec![
            StoredHour {
                temperature: Some(-4.26),
                temperature_feel: Some(-9.04),
                wind_speed: Some(10.0),
                wind_gusts: Some(31.0),
                wind_direction: Some(90.0),
                cloud_cover: Some(80.0),
                ..StoredHour::default()
            },
            StoredHour {
                temperature: Some(-1.0),
                wind_speed: Some(20.0),
                wind_direction: None,
                cloud_cover: None,
                cloud_cover_low: Some(33.0),
                ..StoredHour::default()
            },
            StoredHour {
                wind_speed: Some(30.0),
                wind_direction: Some(90.0),
                cloud_cover: Some(55.0),
                ..StoredHour::default()
            },
        ];
        let day = summarize_day(date(10), &hours).unwrap();
        assert_eq!(day.temp_min, Some(-4.3));
        assert_eq!(day.temp_max, Some(-1.0));
        // second hour falls back to its temperature
        assert_eq!(day.temp_feel_min, Some(-9.0));
        assert_eq!(day.temp_feel_max, Some(-1.0));
        assert_eq!(day.wind_avg, Some(20.0));
        assert_eq!(day.wind_max, Some(30.0));
        assert_eq!(day.gust_max, Some(31.0));
        assert_eq!(day.wind_direction, Some(90.0));
        assert_eq!(day.cloud_avg, Some(68.0));
        assert_eq!(day.cloud_low_avg, Some(33.0));
        assert_eq!(day.cloud_mid_avg, None);
        assert_eq!(day.precip_total, 0.0);
        assert_eq!(day.dominant_weather_code, None);
    }

    #[test]
    fn test_calm_day_has_no_direction() {
        let hours = vec![StoredHour {
            wind_speed: Some(0.0),
            wind_direction: Some(200.0),
            ..StoredHour::default()
        }];
        let day = summarize_day(date(10), &hours).unwrap();
        assert_eq!(day.wind_direction, None);
    }

    #[test]
    fn test_history_skips_empty_days_and_sorts() {
        let days = vec![
            (date(12), DailyRecordFile::Bare(vec![hour(1.0, 0.0, 0)])),
            (date(11), DailyRecordFile::Wrapped { data: vec![] }),
            (date(10), DailyRecordFile::Wrapped { data: vec![hour(2.0, 0.0, 1)] }),
        ];
        let history = build_history(&days, 7).unwrap();
        assert_eq!(history.days_found, 2);
        assert_eq!(history.start_date, date(10));
        assert_eq!(history.end_date, date(12));
        assert_eq!(history.daily_data[0].date, date(10));
        assert_eq!(history.source, "saved_forecast_data");
    }

    #[test]
    fn test_history_without_data_is_absent() {
        assert!(build_history(&[], 7).is_none());
        let days = vec![(date(11), DailyRecordFile::Bare(vec![]))];
        assert!(build_history(&days, 7).is_none());
    }
}

//! Window summary aggregation and direction means

use crate::models::{HourlyForecastPoint, HourlyUnits, WindowSummary, weather::code_text};
use crate::{ForecastError, Result};
use std::collections::BTreeMap;

/// Resultants shorter than this fraction of the total weight have no
/// meaningful direction.
const MIN_RESULTANT_RATIO: f64 = 1e-6;

/// Where the summarised points were taken
#[derive(Debug, Clone, Copy)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Reduce a non-empty window of points into a `WindowSummary`
pub fn summarize_window(
    points: &[HourlyForecastPoint],
    coordinates: Coordinates,
    timezone: &str,
    units: &HourlyUnits,
) -> Result<WindowSummary> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(ForecastError::validation(
            "cannot summarise an empty window of hourly points",
        ));
    };

    let temp_min = points
        .iter()
        .map(|p| p.temperature)
        .fold(f64::INFINITY, f64::min);
    let temp_max = points
        .iter()
        .map(|p| p.temperature)
        .fold(f64::NEG_INFINITY, f64::max);
    let precip_total = points.iter().map(|p| p.precipitation).sum();
    let precip_prob_max = max_present(points.iter().map(|p| p.precipitation_probability));

    #[allow(clippy::cast_precision_loss)]
    let wind_avg = points.iter().map(|p| p.wind_speed).sum::<f64>() / points.len() as f64;
    let wind_max = points
        .iter()
        .map(|p| p.wind_speed)
        .fold(f64::NEG_INFINITY, f64::max);
    let gust_max = max_present(points.iter().map(|p| p.wind_gusts));

    let dominant_conditions = dominant_code(points.iter().filter_map(|p| p.weather_code))
        .map_or_else(
            || "unknown conditions".to_string(),
            |code| code_text(code).map_or_else(|| format!("weather code {code}"), String::from),
        );

    Ok(WindowSummary {
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        timezone: timezone.to_string(),
        window_start_local: first.time_local.clone(),
        window_end_local: last.time_local.clone(),
        temp_min,
        temp_max,
        temp_unit: units.temperature.clone(),
        precip_total,
        precip_unit: units.precipitation.clone(),
        precip_prob_max,
        wind_avg,
        wind_max,
        gust_max,
        wind_unit: units.wind_speed.clone(),
        gust_unit: units.wind_gusts.clone(),
        dominant_wind_direction: scalar_mean_direction(points.iter().map(|p| p.wind_direction)),
        dominant_conditions,
    })
}

/// Max of the present values, `None` when every value is missing
pub(crate) fn max_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    values.into_iter().flatten().reduce(f64::max)
}

/// Mean of the present values, `None` when every value is missing
pub(crate) fn mean_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0_u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

/// Arithmetic mean of the present bearings.
///
/// Does not wrap around north: 350° and 10° average to 180°.
#[must_use]
pub fn scalar_mean_direction(directions: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    mean_present(directions)
}

/// Speed-weighted circular mean of `(speed, direction)` pairs, in [0, 360).
///
/// Meteorological convention: 0° = N, 90° = E. Only pairs with a positive
/// speed and a present direction contribute. Returns `None` when nothing
/// qualifies or the vectors cancel out.
#[must_use]
pub fn vector_mean_direction(
    samples: impl IntoIterator<Item = (Option<f64>, Option<f64>)>,
) -> Option<f64> {
    let mut east = 0.0;
    let mut north = 0.0;
    let mut total_weight = 0.0;

    for (speed, direction) in samples {
        let (Some(speed), Some(direction)) = (speed, direction) else {
            continue;
        };
        if speed <= 0.0 {
            continue;
        }
        let rad = direction.to_radians();
        east += speed * rad.sin();
        north += speed * rad.cos();
        total_weight += speed;
    }

    if total_weight <= 0.0 || east.hypot(north) / total_weight < MIN_RESULTANT_RATIO {
        return None;
    }

    let degrees = east.atan2(north).to_degrees().rem_euclid(360.0);
    // rem_euclid of a tiny negative angle rounds up to exactly 360.0
    Some(if degrees >= 360.0 { 0.0 } else { degrees })
}

/// Most frequent code; ties go to the numerically largest code
#[must_use]
pub fn dominant_code(codes: impl IntoIterator<Item = i64>) -> Option<i64> {
    let mut counts: BTreeMap<i64, u32> = BTreeMap::new();
    for code in codes {
        *counts.entry(code).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(code, count)| (count, code))
        .map(|(code, _)| code)
}

//! Plain-text rendering of forecasts, wind analyses and history

pub mod clothing;

use crate::analysis::{
    Cardinal, DailyHistorySummary, HistoricalWindAnalysis, WeatherHistory, to_cardinal,
};
use crate::models::{EnrichedHourlyPoint, MountainLocation, WindowSummary};
use chrono::NaiveDate;

pub use clothing::{AdviceConditions, ClothingReference, render_clothing_advice, temperature_bucket};

const MISSING: &str = "—";

const CAUTION_PRECIP_PROBABILITY: f64 = 60.0;
const CAUTION_PRECIP_TOTAL_MM: f64 = 2.0;
const CAUTION_WIND_KMH: f64 = 35.0;
const CAUTION_GUST_KMH: f64 = 50.0;

fn or_missing(value: Option<f64>, render: impl Fn(f64) -> String) -> String {
    value.map_or_else(|| MISSING.to_string(), render)
}

/// One-line hiking recommendation for a window
#[must_use]
pub fn caution_suggestion(summary: &WindowSummary) -> String {
    let mut reasons = Vec::new();
    if let Some(prob) = summary
        .precip_prob_max
        .filter(|p| *p >= CAUTION_PRECIP_PROBABILITY)
    {
        reasons.push(format!("high chance of precipitation (up to {prob:.0}%)"));
    }
    if summary.precip_total >= CAUTION_PRECIP_TOTAL_MM {
        reasons.push(format!(
            "wet conditions (≈{:.1}{} total)",
            summary.precip_total, summary.precip_unit
        ));
    }
    if summary.wind_max >= CAUTION_WIND_KMH {
        reasons.push(format!(
            "windy (peaks around {:.0}{})",
            summary.wind_max, summary.wind_unit
        ));
    }
    if let Some(gust) = summary.gust_max.filter(|g| *g >= CAUTION_GUST_KMH) {
        reasons.push(format!("strong gusts (up to {gust:.0}{})", summary.gust_unit));
    }

    if reasons.is_empty() {
        "Looks generally OK for a hike.".to_string()
    } else {
        format!("Caution advised: {}.", reasons.join("; "))
    }
}

fn window_label(points: &[EnrichedHourlyPoint]) -> String {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if first.point.hour != 0 || last.point.hour != 23 => {
            format!("{:02}:00–{:02}:00", first.point.hour, last.point.hour)
        }
        _ => "full day".to_string(),
    }
}

/// Full-day report: header lines followed by the hourly table
#[must_use]
pub fn render_forecast_report(
    location: &MountainLocation,
    date: NaiveDate,
    summary: &WindowSummary,
    points: &[EnrichedHourlyPoint],
) -> String {
    if points.is_empty() {
        return "No data available".to_string();
    }
    let temp_unit = &summary.temp_unit;
    let precip_unit = &summary.precip_unit;
    let wind_unit = &summary.wind_unit;
    let gust_unit = &summary.gust_unit;

    let prob_phrase = summary.precip_prob_max.map_or_else(
        || "Precipitation probability not available.".to_string(),
        |p| format!("Peak precipitation chance: {p:.0}%."),
    );
    let gust_phrase = summary
        .gust_max
        .map(|g| format!(" Gusts up to {g:.0}{gust_unit}."))
        .unwrap_or_default();
    let direction = or_missing(summary.dominant_wind_direction, |d| {
        format!("{d:.0}° ({})", to_cardinal(Some(d)))
    });

    let mut lines = vec![
        format!(
            "Forecast for {date} (local time: {}), {}:",
            summary.timezone,
            window_label(points)
        ),
        format!("- Location: {}", location.describe()),
        format!("- Dominant conditions: {}.", summary.dominant_conditions),
        format!(
            "- Temperature: {:.1}{temp_unit} to {:.1}{temp_unit}.",
            summary.temp_min, summary.temp_max
        ),
        format!(
            "- Precipitation: about {:.1}{precip_unit} total. {prob_phrase}",
            summary.precip_total
        ),
        format!(
            "- Wind: average {:.0}{wind_unit}, max {:.0}{wind_unit}.{gust_phrase}",
            summary.wind_avg, summary.wind_max
        ),
        format!("- Dominant Wind Direction: {direction}"),
        format!("- Recommendation: {}", caution_suggestion(summary)),
        String::new(),
        "Hourly breakdown:".to_string(),
        "Hour | Temp | Feels | Precip | Precip% | Wind | Gusts | Wind Dir | Conditions".to_string(),
        "-----|------|-------|--------|---------|------|-------|----------|-----------".to_string(),
    ];

    lines.extend(points.iter().map(|enriched| {
        let p = &enriched.point;
        let prob = or_missing(p.precipitation_probability, |v| format!("{v:.0}%"));
        let gust = or_missing(p.wind_gusts, |v| format!("{v:.0}{gust_unit}"));
        let dir = or_missing(p.wind_direction, |v| format!("{v:.0}°"));
        format!(
            "{:02}:00 | {:.1}{temp_unit} | {:.1}{temp_unit} | {:.1}{precip_unit} | {prob:>6} | {:.0}{wind_unit} | {gust:>5} | {dir:>8} | {}",
            p.hour,
            p.temperature,
            enriched.temperature_feel,
            p.precipitation,
            p.wind_speed,
            p.conditions
        )
    }));
    lines.join("\n")
}

fn join_labels(directions: &[Cardinal]) -> String {
    directions
        .iter()
        .map(|d| d.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Avalanche-oriented summary of where recent wind came from
#[must_use]
pub fn render_wind_analysis(analysis: Option<&HistoricalWindAnalysis>) -> String {
    let Some(wind) = analysis else {
        return "Historical wind data unavailable".to_string();
    };

    let mut lines = vec![
        format!("{}-DAY WIND ANALYSIS - AVALANCHE RISK ASSESSMENT", wind.days_requested),
        format!("   Period: {}", wind.date_analyzed),
        "   (Recent wind patterns for avalanche risk & snow transport)".to_string(),
        String::new(),
        format!(
            "Analyzed: {} hours over {} of {} days",
            wind.total_hours, wind.days_found, wind.days_requested
        ),
        format!("Dominant Direction: {}", wind.dominant_direction),
        format!("Average Wind Speed: {:.1} km/h", wind.avg_wind_speed),
        format!("Maximum Gust: {:.1} km/h", wind.max_gust),
        String::new(),
        "Wind Distribution by Direction:".to_string(),
        "Direction | Time % | Avg Speed | Max Gust".to_string(),
        "----------|--------|-----------|----------".to_string(),
    ];
    lines.extend(wind.direction_stats.iter().map(|stat| {
        format!(
            "{:>9} | {:>5.1}% | {:>7.1} km/h | {:>6.1} km/h",
            stat.direction.label(),
            stat.percentage,
            stat.avg_speed,
            stat.max_gust
        )
    }));

    lines.push(String::new());
    lines.push("AVALANCHE CONSIDERATIONS:".to_string());
    let top = wind.top_directions(3);
    if !top.is_empty() {
        lines.push(format!("- Wind primarily from: {}", join_labels(&top)));
        lines.push("- Snow likely deposited on: LEE SLOPES (opposite of wind direction)".to_string());
        lines.push(format!(
            "- Higher avalanche risk on slopes facing: {}",
            join_labels(&wind.lee_slopes(3))
        ));
    }
    lines.join("\n")
}

fn history_line(day: &DailyHistorySummary) -> String {
    let temps = match (day.temp_min, day.temp_max) {
        (Some(min), Some(max)) => format!("{min:.1}°C to {max:.1}°C"),
        _ => MISSING.to_string(),
    };
    let feels = match (day.temp_feel_min, day.temp_feel_max) {
        (Some(min), Some(max)) => format!("feels {min:.1}°C to {max:.1}°C"),
        _ => format!("feels {MISSING}"),
    };
    let wind = match (day.wind_avg, day.wind_max) {
        (Some(avg), Some(max)) => format!(
            "wind {avg:.0}/{max:.0}km/h {}",
            to_cardinal(day.wind_direction)
        ),
        _ => format!("wind {MISSING}"),
    };
    let mut flags = Vec::new();
    if day.has_snow {
        flags.push(format!("snow {}h ({:.1}mm)", day.snow_hours, day.snow_precip_mm));
    }
    if day.fog_hours > 0 {
        let kind = if day.has_rime_fog { "rime fog" } else { "fog" };
        flags.push(format!("{kind} {}h", day.fog_hours));
    }

    let line = format!(
        "{} | {temps} | {feels} | {:.1}mm | {wind}",
        day.date, day.precip_total
    );
    if flags.is_empty() {
        line
    } else {
        format!("{line} | {}", flags.join(", "))
    }
}

/// One line per stored day, oldest first
#[must_use]
pub fn render_history(history: &WeatherHistory) -> String {
    let header = format!(
        "WEATHER HISTORY {} to {} ({} of {} days)",
        history.start_date, history.end_date, history.days_found, history.days_requested
    );
    std::iter::once(header)
        .chain(history.daily_data.iter().map(history_line))
        .collect::<Vec<_>>()
        .join("\n")
}

//! Pure aggregation and derivation over hourly weather
//!
//! Nothing in here performs I/O: callers hand in already-fetched points or
//! already-read records and get derived structures back.

pub mod daily_history;
pub mod direction;
pub mod feels_like;
pub mod summary;
pub mod wind_history;

pub use daily_history::{DailyHistorySummary, WeatherHistory, build_history, summarize_day};
pub use direction::{Cardinal, to_cardinal};
pub use feels_like::feels_like;
pub use summary::{
    Coordinates, dominant_code, scalar_mean_direction, summarize_window, vector_mean_direction,
};
pub use wind_history::{
    BucketMode, DirectionStat, HistoricalWindAnalysis, WindSample, analyze_samples,
    analyze_stored,
};

/// Label used wherever a value cannot be derived
pub const NOT_AVAILABLE: &str = "N/A";

/// Round half away from zero to `decimals` places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

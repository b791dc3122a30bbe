//! `MountainForecast` - daily mountain weather forecasts for ski touring
//!
//! This library fetches hourly forecasts for a fixed set of mountain
//! locations, derives feels-like temperatures, wind-direction history and
//! daily weather history, and persists reports and clothing advice to a
//! date-partitioned object store.

pub mod analysis;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod storage;
pub mod weather;

// Re-export core types for public API
pub use analysis::{Cardinal, HistoricalWindAnalysis, WeatherHistory, feels_like, to_cardinal};
pub use config::ForecastConfig;
pub use error::ForecastError;
pub use models::{DailyRecordFile, EnrichedHourlyPoint, HourlyForecastPoint, MountainLocation, WindowSummary};
pub use pipeline::{Pipeline, PipelineSettings, RunOptions, RunSummary};
pub use storage::{LocalStore, MemoryStore, ObjectStore, StorageLayout};
pub use weather::{ForecastSource, OpenMeteoClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastError>;

//! Data models for the mountain forecast pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Location: mountain locations and their storage keys
//! - Weather: hourly points, window summaries and the WMO code table
//! - Record: the persisted shapes read back by the analyzers

pub mod location;
pub mod record;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{MountainLocation, load_locations};
pub use record::{
    CACHE_SCHEMA_VERSION, CachedWeatherData, DailyRecordFile, ForecastMetadata, HourlyDataFile,
    StoredHour,
};
pub use weather::{
    EnrichedHourlyPoint, HourlyForecastPoint, HourlyUnits, WindowSummary, describe_code,
};

//! Configuration management for the mountain forecast pipeline
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ForecastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Object store settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Lookback, horizon and retention windows
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Static reference data locations
    #[serde(default)]
    pub data: DataConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the Open-Meteo API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
    /// Pause between consecutive location fetches
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

/// Object store configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory acting as the bucket
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Prefix for live date partitions
    #[serde(default = "default_data_prefix")]
    pub data_prefix: String,
    /// Prefix archived partitions are relocated to
    #[serde(default = "default_archive_prefix")]
    pub archive_prefix: String,
}

/// Analysis window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Days of stored history fed into wind analysis and daily history
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    /// Number of forecast days generated per run (1 = tomorrow only)
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// Partitions older than this many days are archived
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

/// Static reference files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON list of mountain locations
    #[serde(default = "default_locations_file")]
    pub locations_file: String,
    /// Directory holding `clothing_per_temp_feel*.json`
    #[serde(default = "default_reference_dir")]
    pub reference_dir: String,
    /// Languages to render clothing advice for
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    20
}

fn default_weather_max_retries() -> u32 {
    2
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_storage_root() -> String {
    "./bucket".to_string()
}

fn default_data_prefix() -> String {
    "tomorrow_mountain_forecast_data".to_string()
}

fn default_archive_prefix() -> String {
    "archive/tomorrow_mountain_forecast_data".to_string()
}

fn default_days_back() -> u32 {
    7
}

fn default_forecast_days() -> u32 {
    3
}

fn default_retention_days() -> u32 {
    7
}

fn default_locations_file() -> String {
    "mountain_locations.json".to_string()
}

fn default_reference_dir() -> String {
    ".".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string(), "ro".to_string(), "hu".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_weather_max_retries(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            data_prefix: default_data_prefix(),
            archive_prefix: default_archive_prefix(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            days_back: default_days_back(),
            forecast_days: default_forecast_days(),
            retention_days: default_retention_days(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            locations_file: default_locations_file(),
            reference_dir: default_reference_dir(),
            languages: default_languages(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            storage: StorageConfig::default(),
            analysis: AnalysisConfig::default(),
            data: DataConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl WeatherConfig {
    /// Request timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Pause between location fetches as a `Duration`
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl ForecastConfig {
    /// Load configuration from the default file location and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // MOUNTAIN_FORECAST_STORAGE__ROOT=/data overrides storage.root
        builder = builder.add_source(
            Environment::with_prefix("MOUNTAIN_FORECAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ForecastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mountain-forecast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.storage.root.is_empty() {
            self.storage.root = default_storage_root();
        }
        if self.storage.data_prefix.is_empty() {
            self.storage.data_prefix = default_data_prefix();
        }
        if self.storage.archive_prefix.is_empty() {
            self.storage.archive_prefix = default_archive_prefix();
        }
        if self.analysis.days_back == 0 {
            self.analysis.days_back = default_days_back();
        }
        if self.analysis.forecast_days == 0 {
            self.analysis.forecast_days = default_forecast_days();
        }
        if self.data.languages.is_empty() {
            self.data.languages = default_languages();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                ForecastError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.max_retries > 10 {
            return Err(ForecastError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.analysis.days_back == 0 || self.analysis.days_back > 31 {
            return Err(
                ForecastError::config("Analysis days_back must be between 1 and 31").into(),
            );
        }

        if self.analysis.forecast_days == 0 || self.analysis.forecast_days > 16 {
            return Err(
                ForecastError::config("Forecast days must be between 1 and 16").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(ForecastError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}

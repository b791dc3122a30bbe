//! Error types and handling for the mountain forecast pipeline

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for the forecast library
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors, raised before any I/O
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Network or HTTP status failures talking to the weather provider
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The provider answered but the body could not be decoded
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// The provider returned no hourly time series at all
    #[error("No hourly 'time' data returned by the weather provider")]
    NoData,

    /// The provider returned data, but none of it fell into the requested window
    #[error("No hourly points found for {date} {start_hour:02}:00-{end_hour:02}:00 in the provider response")]
    NoDataInWindow {
        date: NaiveDate,
        start_hour: u32,
        end_hour: u32,
    },

    /// Object store operation errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// JSON encode/decode errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ForecastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True for the two "provider had nothing for us" cases
    #[must_use]
    pub fn is_upstream_empty(&self) -> bool {
        matches!(self, Self::NoData | Self::NoDataInWindow { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            ForecastError::Validation { message } => format!("Invalid input: {message}"),
            ForecastError::Transport { .. } => {
                "Unable to reach the weather provider. Please check your internet connection."
                    .to_string()
            }
            ForecastError::MalformedResponse { .. } => {
                "The weather provider sent data we could not understand.".to_string()
            }
            ForecastError::NoData | ForecastError::NoDataInWindow { .. } => {
                "No forecast data available for the requested day.".to_string()
            }
            ForecastError::Storage { .. } => {
                "Storage operation failed. Please check bucket access.".to_string()
            }
            ForecastError::Json { .. } => "Stored data could not be decoded.".to_string(),
            ForecastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

/// Terminal text for a failed command: the user-facing message of the first
/// `ForecastError` in the chain, or the whole chain when there is none
#[must_use]
pub fn user_facing_message(error: &anyhow::Error) -> String {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ForecastError>())
        .map_or_else(|| format!("{error:#}"), ForecastError::user_message)
}

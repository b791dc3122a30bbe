//! Open-Meteo HTTP client
//!
//! Transient failures (connect errors, timeouts, 5xx, 429) are retried with
//! exponential backoff by the middleware before they surface as `Transport`.

use super::{ForecastResponse, ForecastSource, HourlyRequest};
use crate::config::WeatherConfig;
use crate::{ForecastError, Result};
use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = concat!("mountain-forecast/", env!("CARGO_PKG_VERSION"));

/// Weather API client for Open-Meteo
pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl OpenMeteoClient {
    /// Create a new client from the weather settings
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ForecastError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the forecast URL for a request
    #[must_use]
    pub fn forecast_url(&self, request: &HourlyRequest) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&timezone=auto&start_date={}&end_date={}&hourly={}",
            self.base_url,
            request.latitude,
            request.longitude,
            request.start_date,
            request.end_date,
            request.fields.join(",")
        )
    }
}

/// Decode a forecast body; anything undecodable is `MalformedResponse`
pub fn parse_forecast(body: &[u8]) -> Result<ForecastResponse> {
    serde_json::from_slice(body)
        .map_err(|e| ForecastError::malformed(format!("Failed to parse Open-Meteo response: {e}")))
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = request.latitude, lon = request.longitude))]
    async fn fetch_hourly(&self, request: &HourlyRequest) -> Result<ForecastResponse> {
        let url = self.forecast_url(request);
        debug!(%url, "Requesting hourly forecast");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ForecastError::transport(format!("Request to Open-Meteo failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            warn!(%status, "Open-Meteo returned an error status");
            return Err(ForecastError::transport(format!(
                "Open-Meteo returned HTTP {status}: {reason}"
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            ForecastError::transport(format!("Failed to read Open-Meteo response: {e}"))
        })?;
        parse_forecast(&body)
    }
}

//! Forecast generation run: every location for every upcoming day
//!
//! Per-location failures are collected and reported next to the results;
//! only a failure to write a date's metadata aborts the run.

use crate::analysis::{
    HistoricalWindAnalysis, WeatherHistory, analyze_stored, build_history,
};
use crate::config::ForecastConfig;
use crate::models::{
    CACHE_SCHEMA_VERSION, CachedWeatherData, EnrichedHourlyPoint, ForecastMetadata,
    HourlyDataFile, MountainLocation, WindowSummary,
};
use crate::report::{
    AdviceConditions, ClothingReference, render_clothing_advice, render_forecast_report,
    render_history, render_wind_analysis,
};
use crate::storage::{
    ArchiveReport, ObjectStore, StorageLayout, archive_old_data, put_json, read_history,
    write_day,
};
use crate::weather::{ForecastSource, HourWindow, fetch_day_window, fetch_live_wind_analysis, target_date};
use crate::{ForecastError, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const TIME_WINDOW_LABEL: &str = "full_day_24h";
const SECTION_RULE_WIDTH: usize = 80;

/// Run-wide knobs, taken from configuration
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub forecast_days: u32,
    pub days_back: u32,
    pub retention_days: u32,
    pub request_delay: Duration,
    pub languages: Vec<String>,
    pub reference_dir: PathBuf,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            forecast_days: config.analysis.forecast_days,
            days_back: config.analysis.days_back,
            retention_days: config.analysis.retention_days,
            request_delay: config.weather.request_delay(),
            languages: config.data.languages.clone(),
            reference_dir: PathBuf::from(&config.data.reference_dir),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Reuse a current-schema `weather_data_24h.json` instead of fetching
    pub use_cache: bool,
    pub skip_archive: bool,
}

/// Outcome for one forecast date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRunResult {
    pub date: NaiveDate,
    pub locations_processed: usize,
    pub files_written: usize,
    pub errors: Vec<String>,
}

/// What a run did, printed as JSON by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// 200 when everything succeeded, 207 on partial failure
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub days_processed: usize,
    pub total_locations: usize,
    pub total_files: usize,
    pub forecast_results: Vec<DateRunResult>,
    pub archive_results: Option<ArchiveReport>,
    pub errors: Vec<String>,
}

struct DayForecast {
    summary: WindowSummary,
    points: Vec<EnrichedHourlyPoint>,
    report_text: String,
    fetched_at: String,
    from_cache: bool,
}

pub struct Pipeline {
    source: Arc<dyn ForecastSource>,
    store: Arc<dyn ObjectStore>,
    layout: StorageLayout,
    settings: PipelineSettings,
    locations: Vec<MountainLocation>,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn ForecastSource>,
        store: Arc<dyn ObjectStore>,
        layout: StorageLayout,
        settings: PipelineSettings,
        locations: Vec<MountainLocation>,
    ) -> Self {
        Self {
            source,
            store,
            layout,
            settings,
            locations,
        }
    }

    #[must_use]
    pub fn locations(&self) -> &[MountainLocation] {
        &self.locations
    }

    /// Generate forecasts for days `1..=forecast_days` after `today`, then
    /// archive partitions past retention.
    pub async fn run(&self, today: NaiveDate, options: RunOptions) -> Result<RunSummary> {
        info!(
            locations = self.locations.len(),
            days = self.settings.forecast_days,
            use_cache = options.use_cache,
            "Starting forecast run"
        );
        let references = self.load_references();

        let mut forecast_results = Vec::new();
        let mut errors = Vec::new();
        for day_offset in 1..=self.settings.forecast_days {
            let result = self
                .generate_for_date(today, day_offset, options.use_cache, &references)
                .await?;
            errors.extend(result.errors.iter().cloned());
            forecast_results.push(result);
        }

        let archive_results = if options.skip_archive {
            None
        } else {
            let report = archive_old_data(
                self.store.as_ref(),
                &self.layout,
                today,
                self.settings.retention_days,
                false,
            )
            .await;
            errors.extend(report.errors.iter().cloned());
            Some(report)
        };

        let summary = RunSummary {
            status_code: if errors.is_empty() { 200 } else { 207 },
            days_processed: forecast_results.len(),
            total_locations: forecast_results.iter().map(|r| r.locations_processed).sum(),
            total_files: forecast_results.iter().map(|r| r.files_written).sum(),
            forecast_results,
            archive_results,
            errors,
        };
        info!(
            status = summary.status_code,
            locations = summary.total_locations,
            files = summary.total_files,
            "Forecast run complete"
        );
        Ok(summary)
    }

    fn load_references(&self) -> Vec<(String, std::result::Result<ClothingReference, String>)> {
        self.settings
            .languages
            .iter()
            .map(|language| {
                let reference =
                    ClothingReference::load(&self.settings.reference_dir, language).map_err(|e| {
                        warn!(%language, error = %e, "Clothing reference unavailable");
                        e.to_string()
                    });
                (language.clone(), reference)
            })
            .collect()
    }

    /// Every location for one date, then the date's metadata
    #[instrument(skip(self, references))]
    async fn generate_for_date(
        &self,
        today: NaiveDate,
        day_offset: u32,
        use_cache: bool,
        references: &[(String, std::result::Result<ClothingReference, String>)],
    ) -> Result<DateRunResult> {
        let date = target_date(today, day_offset)?;
        let mut result = DateRunResult {
            date,
            locations_processed: 0,
            files_written: 0,
            errors: Vec::new(),
        };

        for location in &self.locations {
            info!(location = %location.describe(), %date, "Processing location");
            match self
                .process_location(location, today, day_offset, date, use_cache, references)
                .await
            {
                Ok((files, advice_errors)) => {
                    result.locations_processed += 1;
                    result.files_written += files;
                    result.errors.extend(advice_errors);
                }
                Err(e) => {
                    let message = format!("Error processing {}: {e}", location.name);
                    if e.is_upstream_empty() {
                        info!("{message}");
                    } else {
                        warn!("{message}");
                    }
                    result.errors.push(message);
                }
            }
        }

        let metadata = ForecastMetadata {
            forecast_date: date,
            generated_at: today,
            locations_count: self.locations.len(),
            time_window: TIME_WINDOW_LABEL.to_string(),
        };
        put_json(self.store.as_ref(), &self.layout.metadata_key(date), &metadata).await?;
        result.files_written += 1;

        Ok(result)
    }

    /// Files written and per-language advice failures for one location
    async fn process_location(
        &self,
        location: &MountainLocation,
        today: NaiveDate,
        day_offset: u32,
        date: NaiveDate,
        use_cache: bool,
        references: &[(String, std::result::Result<ClothingReference, String>)],
    ) -> Result<(usize, Vec<String>)> {
        let store = self.store.as_ref();
        let base_key = location.base_key();
        let mut files = 0;

        let forecast = self
            .day_forecast(location, &base_key, today, day_offset, date, use_cache)
            .await?;

        let hourly = HourlyDataFile {
            fetched_at: forecast.fetched_at.clone(),
            forecast_date: date,
            location: location.name.clone(),
            data: forecast.points.clone(),
        };
        write_day(store, &self.layout, &base_key, date, &hourly).await?;
        files += 1;

        if !forecast.from_cache {
            let cache = CachedWeatherData {
                schema_version: CACHE_SCHEMA_VERSION,
                location_data: location.clone(),
                weather_report_text: forecast.report_text.clone(),
                weather_summary: forecast.summary.clone(),
                hourly_points: forecast.points.clone(),
                fetched_at: forecast.fetched_at.clone(),
            };
            put_json(store, &self.layout.weather_cache_key(date, &base_key), &cache).await?;
            files += 1;
        }

        let days = read_history(store, &self.layout, &base_key, date, self.settings.days_back).await?;
        let wind = analyze_stored(&days, self.settings.days_back);
        let history = build_history(&days, self.settings.days_back);

        let report = full_report(&forecast.report_text, wind.as_ref(), history.as_ref());
        store
            .put(&self.layout.report_key(date, &base_key), report.into_bytes())
            .await?;
        files += 1;

        if let Some(wind) = &wind {
            put_json(store, &self.layout.wind_analysis_key(date, &base_key), wind).await?;
            files += 1;
            info!(days_found = wind.days_found, "Wind analysis written");
        } else {
            info!("Wind analysis: no historical data available yet");
        }
        if let Some(history) = &history {
            put_json(store, &self.layout.history_key(date, &base_key), history).await?;
            files += 1;
            info!(days_found = history.days_found, "Weather history written");
        }

        let mut advice_errors = Vec::new();
        let conditions = AdviceConditions::from_points(&forecast.points);
        for (language, reference) in references {
            let advice = match (reference, &conditions) {
                (Ok(reference), Some(conditions)) => {
                    render_clothing_advice(reference, conditions).map_err(|e| e.to_string())
                }
                (Err(e), _) => Err(e.clone()),
                (_, None) => Err("no hourly points to advise on".to_string()),
            };
            match advice {
                Ok(text) => {
                    store
                        .put(
                            &self.layout.advice_key(date, &base_key, language),
                            text.into_bytes(),
                        )
                        .await?;
                    files += 1;
                }
                Err(e) => {
                    let message =
                        format!("Error generating {language} advice for {}: {e}", location.name);
                    warn!("{message}");
                    advice_errors.push(message);
                }
            }
        }

        Ok((files, advice_errors))
    }

    async fn day_forecast(
        &self,
        location: &MountainLocation,
        base_key: &str,
        today: NaiveDate,
        day_offset: u32,
        date: NaiveDate,
        use_cache: bool,
    ) -> Result<DayForecast> {
        if use_cache {
            let key = self.layout.weather_cache_key(date, base_key);
            match self.store.get(&key).await? {
                Some(bytes) => match CachedWeatherData::decode_current(&bytes) {
                    Some(cached) if cached.location_data == *location => {
                        debug!(%key, "Using cached weather data");
                        return Ok(DayForecast {
                            summary: cached.weather_summary,
                            points: cached.hourly_points,
                            report_text: cached.weather_report_text,
                            fetched_at: cached.fetched_at,
                            from_cache: true,
                        });
                    }
                    _ => info!(%key, "Cached weather data is stale, re-fetching"),
                },
                None => debug!(%key, "No cached weather data"),
            }
        }

        let window = fetch_day_window(
            self.source.as_ref(),
            location.coordinates(),
            HourWindow::FULL_DAY,
            today,
            day_offset,
        )
        .await?;
        let fetched_at = Utc::now().to_rfc3339();
        tokio::time::sleep(self.settings.request_delay).await;

        let points: Vec<EnrichedHourlyPoint> = window
            .points
            .into_iter()
            .map(EnrichedHourlyPoint::from_point)
            .collect();
        let report_text = render_forecast_report(location, date, &window.summary, &points);
        Ok(DayForecast {
            summary: window.summary,
            points,
            report_text,
            fetched_at,
            from_cache: false,
        })
    }

    /// Wind analysis for one location ahead of `date`, from stored records
    /// or straight from the provider.
    pub async fn analyze_wind(
        &self,
        location: &MountainLocation,
        date: NaiveDate,
        live: bool,
    ) -> Result<Option<HistoricalWindAnalysis>> {
        if live {
            return fetch_live_wind_analysis(
                self.source.as_ref(),
                location.coordinates(),
                date,
                self.settings.days_back,
            )
            .await;
        }
        let days = read_history(
            self.store.as_ref(),
            &self.layout,
            &location.base_key(),
            date,
            self.settings.days_back,
        )
        .await?;
        Ok(analyze_stored(&days, self.settings.days_back))
    }

    /// Look a location up by name, case-insensitively
    pub fn find_location(&self, name: &str) -> Result<&MountainLocation> {
        self.locations
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name) || l.base_key() == name)
            .ok_or_else(|| ForecastError::validation(format!("Unknown location: {name}")))
    }
}

fn full_report(
    forecast: &str,
    wind: Option<&HistoricalWindAnalysis>,
    history: Option<&WeatherHistory>,
) -> String {
    let rule = "=".repeat(SECTION_RULE_WIDTH);
    let mut report = forecast.to_string();
    if wind.is_some() {
        report = format!("{report}\n\n{rule}\n{}", render_wind_analysis(wind));
    }
    if let Some(history) = history {
        report = format!("{report}\n\n{rule}\n{}", render_history(history));
    }
    report
}

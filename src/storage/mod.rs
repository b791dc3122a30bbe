//! Object storage: the store seam, the key layout and record helpers
//!
//! Keys are `/`-separated paths relative to the bucket root. One date
//! partition per calendar day, one file per location and artifact.

pub mod archive;
pub mod local;
pub mod memory;

use crate::config::StorageConfig;
use crate::models::{DailyRecordFile, HourlyDataFile};
use crate::{ForecastError, Result};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub use archive::{ArchiveReport, archive_old_data};
pub use local::LocalStore;
pub use memory::MemoryStore;

/// Minimal bucket operations the pipeline needs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Object body, `None` when the key does not exist
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or replace an object
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()>;

    /// Every key starting with `prefix`, sorted
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    async fn copy(&self, from: &str, to: &str) -> Result<()>;

    /// Delete an object; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Distinct "directories" directly under `prefix`, each ending in `/`
    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>> {
        let keys = self.list(prefix).await?;
        let prefixes: BTreeSet<String> = keys
            .iter()
            .filter_map(|key| {
                let rest = key.strip_prefix(prefix)?;
                let end = rest.find('/')?;
                Some(format!("{prefix}{}", &rest[..=end]))
            })
            .collect();
        Ok(prefixes.into_iter().collect())
    }
}

/// Where each artifact lives inside the bucket
#[derive(Debug, Clone, PartialEq)]
pub struct StorageLayout {
    pub data_prefix: String,
    pub archive_prefix: String,
}

impl StorageLayout {
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            data_prefix: config.data_prefix.trim_end_matches('/').to_string(),
            archive_prefix: config.archive_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// `{data}/date=`, the listing prefix for every partition
    #[must_use]
    pub fn partitions_prefix(&self) -> String {
        format!("{}/date=", self.data_prefix)
    }

    #[must_use]
    pub fn partition_prefix(&self, date: NaiveDate) -> String {
        format!("{}/date={date}/", self.data_prefix)
    }

    #[must_use]
    pub fn archive_partition_prefix(&self, date: NaiveDate) -> String {
        format!("{}/date={date}/", self.archive_prefix)
    }

    fn location_key(&self, date: NaiveDate, base_key: &str, suffix: &str) -> String {
        format!("{}{base_key}_{suffix}", self.partition_prefix(date))
    }

    #[must_use]
    pub fn hourly_key(&self, date: NaiveDate, base_key: &str) -> String {
        self.location_key(date, base_key, "hourly_data_full_day.json")
    }

    #[must_use]
    pub fn weather_cache_key(&self, date: NaiveDate, base_key: &str) -> String {
        self.location_key(date, base_key, "weather_data_24h.json")
    }

    #[must_use]
    pub fn report_key(&self, date: NaiveDate, base_key: &str) -> String {
        self.location_key(date, base_key, "weather_report_full_day.txt")
    }

    #[must_use]
    pub fn wind_analysis_key(&self, date: NaiveDate, base_key: &str) -> String {
        self.location_key(date, base_key, "wind_analysis.json")
    }

    #[must_use]
    pub fn history_key(&self, date: NaiveDate, base_key: &str) -> String {
        self.location_key(date, base_key, "7day_history.json")
    }

    #[must_use]
    pub fn advice_key(&self, date: NaiveDate, base_key: &str, language: &str) -> String {
        self.location_key(date, base_key, &format!("model_advice_{language}.md"))
    }

    #[must_use]
    pub fn metadata_key(&self, date: NaiveDate) -> String {
        format!("{}forecast_metadata.json", self.partition_prefix(date))
    }
}

/// Serialize `value` as pretty JSON and store it
pub async fn put_json<T: Serialize + Sync>(
    store: &dyn ObjectStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let body = serde_json::to_vec_pretty(value)?;
    store.put(key, body).await
}

/// Read and decode a JSON object, `None` when missing
pub async fn get_json<T: DeserializeOwned>(store: &dyn ObjectStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Persist a location's hourly record for `date`
pub async fn write_day(
    store: &dyn ObjectStore,
    layout: &StorageLayout,
    base_key: &str,
    date: NaiveDate,
    record: &HourlyDataFile,
) -> Result<()> {
    put_json(store, &layout.hourly_key(date, base_key), record).await
}

/// Read a location's hourly record for `date`, in either stored shape.
///
/// A missing or undecodable file is `None`: the analyzers skip that day.
pub async fn read_day(
    store: &dyn ObjectStore,
    layout: &StorageLayout,
    base_key: &str,
    date: NaiveDate,
) -> Result<Option<DailyRecordFile>> {
    let key = layout.hourly_key(date, base_key);
    let Some(bytes) = store.get(&key).await? else {
        return Ok(None);
    };
    match serde_json::from_slice(&bytes) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            warn!(%key, error = %e, "Skipping undecodable hourly record");
            Ok(None)
        }
    }
}

/// Records for the `days_back` days before `reference_date`, newest first.
/// Days without a file are skipped.
pub async fn read_history(
    store: &dyn ObjectStore,
    layout: &StorageLayout,
    base_key: &str,
    reference_date: NaiveDate,
    days_back: u32,
) -> Result<Vec<(NaiveDate, DailyRecordFile)>> {
    let dates = (1..=days_back)
        .map(|offset| {
            reference_date
                .checked_sub_days(Days::new(offset.into()))
                .ok_or_else(|| ForecastError::validation("history lookback out of range"))
        })
        .collect::<Result<Vec<NaiveDate>>>()?;

    let records = futures::future::join_all(
        dates
            .iter()
            .map(|date| read_day(store, layout, base_key, *date)),
    )
    .await;

    let mut days = Vec::new();
    for (date, record) in dates.into_iter().zip(records) {
        if let Some(record) = record? {
            days.push((date, record));
        }
    }
    debug!(base_key, found = days.len(), days_back, "Read stored history");
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichedHourlyPoint, HourlyForecastPoint};

    fn layout() -> StorageLayout {
        StorageLayout::new(&StorageConfig::default())
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    #[test]
    fn test_layout_keys() {
        let layout = layout();
        assert_eq!(
            layout.hourly_key(date(28), "bucegi_omu"),
            "tomorrow_mountain_forecast_data/date=2026-01-28/bucegi_omu_hourly_data_full_day.json"
        );
        assert_eq!(
            layout.advice_key(date(28), "bucegi_omu", "ro"),
            "tomorrow_mountain_forecast_data/date=2026-01-28/bucegi_omu_model_advice_ro.md"
        );
        assert_eq!(
            layout.metadata_key(date(28)),
            "tomorrow_mountain_forecast_data/date=2026-01-28/forecast_metadata.json"
        );
        assert_eq!(
            layout.archive_partition_prefix(date(3)),
            "archive/tomorrow_mountain_forecast_data/date=2026-01-03/"
        );
        assert_eq!(layout.partitions_prefix(), "tomorrow_mountain_forecast_data/date=");
    }

    #[tokio::test]
    async fn test_list_prefixes() {
        let store = MemoryStore::new();
        let layout = layout();
        for key in [
            layout.hourly_key(date(1), "a"),
            layout.hourly_key(date(1), "b"),
            layout.metadata_key(date(2)),
        ] {
            store.put(&key, b"{}".to_vec()).await.unwrap();
        }
        let prefixes = store
            .list_prefixes(&layout.partitions_prefix())
            .await
            .unwrap();
        assert_eq!(
            prefixes,
            vec![
                "tomorrow_mountain_forecast_data/date=2026-01-01/".to_string(),
                "tomorrow_mountain_forecast_data/date=2026-01-02/".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_write_then_read_day() {
        let store = MemoryStore::new();
        let layout = layout();
        let record = HourlyDataFile {
            fetched_at: "2026-01-27T06:00:00+00:00".to_string(),
            forecast_date: date(28),
            location: "Omu".to_string(),
            data: vec![EnrichedHourlyPoint::from_point(HourlyForecastPoint {
                time_local: "2026-01-28T00:00".to_string(),
                hour: 0,
                temperature: -8.0,
                precipitation: 0.0,
                precipitation_probability: Some(10.0),
                wind_speed: 25.0,
                wind_gusts: Some(40.0),
                weather_code: Some(3),
                wind_direction: Some(300.0),
                conditions: "overcast".to_string(),
                cloud_cover: Some(100.0),
                cloud_cover_low: None,
                cloud_cover_mid: None,
                cloud_cover_high: None,
            })],
        };

        write_day(&store, &layout, "bucegi_omu", date(28), &record)
            .await
            .unwrap();
        let read = read_day(&store, &layout, "bucegi_omu", date(28))
            .await
            .unwrap()
            .unwrap();
        let hour = &read.hours()[0];
        assert_eq!(hour.wind_direction, Some(300.0));
        assert_eq!(hour.temperature_feel, Some(record.data[0].temperature_feel));

        assert!(read_day(&store, &layout, "bucegi_omu", date(27)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_history_skips_missing_and_corrupt_days() {
        let store = MemoryStore::new();
        let layout = layout();
        store
            .put(&layout.hourly_key(date(9), "x"), br#"[{"wind_speed": 3.0}]"#.to_vec())
            .await
            .unwrap();
        store
            .put(&layout.hourly_key(date(8), "x"), b"{not json".to_vec())
            .await
            .unwrap();
        store
            .put(&layout.hourly_key(date(3), "x"), br#"{"data": []}"#.to_vec())
            .await
            .unwrap();

        let days = read_history(&store, &layout, "x", date(10), 7).await.unwrap();
        let dates: Vec<NaiveDate> = days.iter().map(|(d, _)| *d).collect();
        assert_eq!(dates, vec![date(9), date(3)]);
    }
}

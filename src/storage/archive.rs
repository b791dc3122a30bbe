//! Retention sweep: relocate old date partitions under the archive prefix

use super::{ObjectStore, StorageLayout};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveReport {
    pub cutoff_date: Option<NaiveDate>,
    pub dates_archived: Vec<NaiveDate>,
    pub objects_moved: usize,
    pub errors: Vec<String>,
    pub dry_run: bool,
}

/// Archive every partition dated strictly before `today - retention_days`.
///
/// Listing and per-object failures are recorded in the report; the sweep
/// itself never fails.
#[instrument(skip(store, layout))]
pub async fn archive_old_data(
    store: &dyn ObjectStore,
    layout: &StorageLayout,
    today: NaiveDate,
    retention_days: u32,
    dry_run: bool,
) -> ArchiveReport {
    let mut report = ArchiveReport {
        dry_run,
        ..ArchiveReport::default()
    };
    let Some(cutoff) = today.checked_sub_days(Days::new(retention_days.into())) else {
        report
            .errors
            .push(format!("Retention of {retention_days} days is out of range"));
        return report;
    };
    report.cutoff_date = Some(cutoff);
    info!(%cutoff, retention_days, "Archiving data older than cutoff");

    let listing_prefix = layout.partitions_prefix();
    let partitions = match store.list_prefixes(&listing_prefix).await {
        Ok(partitions) => partitions,
        Err(e) => {
            report.errors.push(format!("Error listing stored objects: {e}"));
            return report;
        }
    };

    for partition in partitions {
        let date_text = partition
            .strip_prefix(&listing_prefix)
            .unwrap_or(&partition)
            .trim_end_matches('/');
        let date = match NaiveDate::parse_from_str(date_text, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                report
                    .errors
                    .push(format!("Could not parse date from prefix {partition}: {e}"));
                continue;
            }
        };
        if date >= cutoff {
            continue;
        }

        info!(%date, dry_run, "Archiving partition");
        report.objects_moved +=
            archive_partition(store, layout, &partition, date, dry_run, &mut report.errors).await;
        report.dates_archived.push(date);
    }

    report
}

async fn archive_partition(
    store: &dyn ObjectStore,
    layout: &StorageLayout,
    source_prefix: &str,
    date: NaiveDate,
    dry_run: bool,
    errors: &mut Vec<String>,
) -> usize {
    let keys = match store.list(source_prefix).await {
        Ok(keys) => keys,
        Err(e) => {
            errors.push(format!("Error archiving folder {source_prefix}: {e}"));
            return 0;
        }
    };
    if dry_run {
        return keys.len();
    }

    let archive_prefix = layout.archive_partition_prefix(date);
    let mut moved = 0;
    for source_key in keys {
        let relative = source_key.strip_prefix(source_prefix).unwrap_or(&source_key);
        let archive_key = format!("{archive_prefix}{relative}");
        let result = match store.copy(&source_key, &archive_key).await {
            Ok(()) => store.delete(&source_key).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => moved += 1,
            Err(e) => {
                warn!(%source_key, error = %e, "Failed to archive object");
                errors.push(format!("Error archiving {source_key}: {e}"));
            }
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::storage::MemoryStore;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    async fn seeded() -> (MemoryStore, StorageLayout) {
        let store = MemoryStore::new();
        let layout = StorageLayout::new(&StorageConfig::default());
        for day in [1, 2, 3, 8, 20] {
            store.put(&layout.hourly_key(date(day), "a"), vec![day as u8]).await.unwrap();
            store.put(&layout.metadata_key(date(day)), b"{}".to_vec()).await.unwrap();
        }
        (store, layout)
    }

    #[tokio::test]
    async fn test_moves_partitions_strictly_before_cutoff() {
        let (store, layout) = seeded().await;
        // cutoff is 2026-01-03: the 3rd itself stays
        let report = archive_old_data(&store, &layout, date(10), 7, false).await;

        assert_eq!(report.cutoff_date, Some(date(3)));
        assert_eq!(report.dates_archived, vec![date(1), date(2)]);
        assert_eq!(report.objects_moved, 4);
        assert!(report.errors.is_empty());

        assert!(store.get(&layout.hourly_key(date(1), "a")).await.unwrap().is_none());
        assert_eq!(
            store
                .get("archive/tomorrow_mountain_forecast_data/date=2026-01-01/a_hourly_data_full_day.json")
                .await
                .unwrap(),
            Some(vec![1])
        );
        assert!(store.get(&layout.hourly_key(date(3), "a")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_dry_run_leaves_objects_in_place() {
        let (store, layout) = seeded().await;
        let before = store.keys().await;
        let report = archive_old_data(&store, &layout, date(10), 7, true).await;

        assert_eq!(report.dates_archived.len(), 2);
        assert_eq!(report.objects_moved, 4);
        assert_eq!(store.keys().await, before);
    }

    #[tokio::test]
    async fn test_unparseable_partition_is_recorded() {
        let (store, layout) = seeded().await;
        store
            .put("tomorrow_mountain_forecast_data/date=latest/x.json", vec![])
            .await
            .unwrap();
        let report = archive_old_data(&store, &layout, date(10), 7, false).await;

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("date=latest/"));
        assert_eq!(report.dates_archived.len(), 2);
    }
}

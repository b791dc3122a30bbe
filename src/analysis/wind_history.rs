//! Historical wind-direction distribution for avalanche risk assessment
//!
//! Wind transports snow onto lee slopes, so the share of recent hours the
//! wind blew from each direction tells which aspects are loaded.

use super::direction::Cardinal;
use super::round_to;
use crate::models::{DailyRecordFile, StoredHour};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How direction buckets are reported.
///
/// `Stored` reads persisted daily files and always lists all 8 buckets,
/// zero-filled. `LiveFetch` reads one provider response and omits
/// buckets nobody blew from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketMode {
    #[serde(rename = "saved_forecast_data")]
    Stored,
    #[serde(rename = "live_fetch")]
    LiveFetch,
}

/// One hour with both a wind speed and a wind direction
#[derive(Debug, Clone, PartialEq)]
pub struct WindSample {
    pub date: NaiveDate,
    pub speed: f64,
    pub gust: Option<f64>,
    pub direction: f64,
}

impl WindSample {
    /// `None` unless the hour carries both speed and direction
    #[must_use]
    pub fn from_stored(date: NaiveDate, hour: &StoredHour) -> Option<Self> {
        Some(Self {
            date,
            speed: hour.wind_speed?,
            gust: hour.wind_gusts,
            direction: hour.wind_direction?,
        })
    }
}

/// Wind statistics for one cardinal bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionStat {
    pub direction: Cardinal,
    /// Share of qualifying hours, in percent
    pub percentage: f64,
    pub avg_speed: f64,
    /// 0 when no gust was observed
    pub max_gust: f64,
    pub hours_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalWindAnalysis {
    /// `"{start_date} to {end_date}"`
    pub date_analyzed: String,
    pub total_hours: u32,
    pub days_requested: u32,
    /// `total_hours / 24`, one decimal
    pub days_with_data: f64,
    /// Distinct days contributing at least one hour
    pub days_found: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub dominant_direction: Cardinal,
    pub avg_wind_speed: f64,
    pub max_gust: f64,
    /// Sorted by percentage, most common first
    pub direction_stats: Vec<DirectionStat>,
    pub source: BucketMode,
}

impl HistoricalWindAnalysis {
    /// Up to `n` most common directions the wind actually blew from
    #[must_use]
    pub fn top_directions(&self, n: usize) -> Vec<Cardinal> {
        self.direction_stats
            .iter()
            .filter(|stat| stat.hours_count > 0)
            .take(n)
            .map(|stat| stat.direction)
            .collect()
    }

    /// Slopes facing away from the top `n` directions
    #[must_use]
    pub fn lee_slopes(&self, n: usize) -> Vec<Cardinal> {
        self.top_directions(n)
            .into_iter()
            .map(Cardinal::opposite)
            .collect()
    }
}

#[derive(Default)]
struct Bucket {
    speed_sum: f64,
    max_gust: f64,
    count: u32,
}

/// Bucket samples by direction. `None` when there are no samples at all.
#[must_use]
pub fn analyze_samples(
    samples: &[WindSample],
    mode: BucketMode,
    days_requested: u32,
) -> Option<HistoricalWindAnalysis> {
    let mut buckets: [Bucket; 8] = Default::default();
    let mut dates = BTreeSet::new();
    let mut total_speed = 0.0;
    let mut max_gust_overall: f64 = 0.0;

    for sample in samples {
        let bucket = &mut buckets[Cardinal::from_degrees(sample.direction).index()];
        bucket.count += 1;
        bucket.speed_sum += sample.speed;
        if let Some(gust) = sample.gust {
            bucket.max_gust = bucket.max_gust.max(gust);
            max_gust_overall = max_gust_overall.max(gust);
        }
        total_speed += sample.speed;
        dates.insert(sample.date);
    }

    let total_hours = u32::try_from(samples.len()).ok()?;
    let (Some(&start_date), Some(&end_date)) = (dates.first(), dates.last()) else {
        return None;
    };

    let total = f64::from(total_hours);
    let mut direction_stats: Vec<DirectionStat> = Cardinal::ALL
        .iter()
        .zip(&buckets)
        .filter(|(_, bucket)| mode == BucketMode::Stored || bucket.count > 0)
        .map(|(&direction, bucket)| {
            let (percentage, avg_speed) = if bucket.count == 0 {
                (0.0, 0.0)
            } else {
                let count = f64::from(bucket.count);
                (100.0 * count / total, bucket.speed_sum / count)
            };
            DirectionStat {
                direction,
                percentage: round_to(percentage, 1),
                avg_speed: round_to(avg_speed, 1),
                max_gust: round_to(bucket.max_gust, 1),
                hours_count: bucket.count,
            }
        })
        .collect();

    // stable: equal percentages keep N, NE, E, ... order
    direction_stats.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

    let dominant_direction = direction_stats.first()?.direction;

    Some(HistoricalWindAnalysis {
        date_analyzed: format!("{start_date} to {end_date}"),
        total_hours,
        days_requested,
        days_with_data: round_to(total / 24.0, 1),
        days_found: dates.len(),
        start_date,
        end_date,
        dominant_direction,
        avg_wind_speed: round_to(total_speed / total, 1),
        max_gust: round_to(max_gust_overall, 1),
        direction_stats,
        source: mode,
    })
}

/// Analyse persisted daily files (any shape) in `Stored` mode
#[must_use]
pub fn analyze_stored(
    days: &[(NaiveDate, DailyRecordFile)],
    days_requested: u32,
) -> Option<HistoricalWindAnalysis> {
    let samples: Vec<WindSample> = days
        .iter()
        .flat_map(|(date, record)| {
            record
                .hours()
                .iter()
                .filter_map(|hour| WindSample::from_stored(*date, hour))
        })
        .collect();
    analyze_samples(&samples, BucketMode::Stored, days_requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    fn sample(day: u32, speed: f64, direction: f64, gust: Option<f64>) -> WindSample {
        WindSample {
            date: date(day),
            speed,
            gust,
            direction,
        }
    }

    #[test]
    fn test_percentage_and_days_ties_round_up() {
        let mut samples: Vec<WindSample> = (0..45).map(|_| sample(5, 10.0, 180.0, None)).collect();
        samples.extend((0..3).map(|_| sample(6, 10.0, 0.0, None)));
        let analysis = analyze_samples(&samples, BucketMode::Stored, 7).unwrap();
        // 3 of 48 hours is 6.25%
        let north = analysis
            .direction_stats
            .iter()
            .find(|stat| stat.direction == Cardinal::N)
            .unwrap();
        assert_eq!(north.percentage, 6.3);

        // 30 hours is 1.25 days
        let analysis = analyze_samples(&samples[..30], BucketMode::Stored, 7).unwrap();
        assert_eq!(analysis.days_with_data, 1.3);
    }

    #[test]
    fn test_no_samples_is_absent() {
        assert!(analyze_samples(&[], BucketMode::Stored, 7).is_none());
        assert!(analyze_samples(&[], BucketMode::LiveFetch, 7).is_none());
    }

    #[test]
    fn test_stored_mode_zero_fills_all_buckets() {
        let samples = vec![
            sample(5, 10.0, 90.0, Some(25.0)),
            sample(5, 20.0, 95.0, None),
            sample(6, 30.0, 270.0, Some(40.0)),
        ];
        let analysis = analyze_samples(&samples, BucketMode::Stored, 7).unwrap();

        assert_eq!(analysis.direction_stats.len(), 8);
        assert_eq!(analysis.dominant_direction, Cardinal::E);
        assert_eq!(analysis.direction_stats[0].percentage, 66.7);
        assert_eq!(analysis.direction_stats[0].avg_speed, 15.0);
        assert_eq!(analysis.direction_stats[0].max_gust, 25.0);
        assert_eq!(analysis.direction_stats[1].direction, Cardinal::W);
        assert_eq!(analysis.direction_stats[1].percentage, 33.3);
        // zero buckets follow in enumeration order
        assert_eq!(analysis.direction_stats[2].direction, Cardinal::N);
        assert_eq!(analysis.direction_stats[2].hours_count, 0);
        assert_eq!(analysis.direction_stats[7].direction, Cardinal::NW);

        assert_eq!(analysis.total_hours, 3);
        assert_eq!(analysis.days_with_data, 0.1);
        assert_eq!(analysis.days_found, 2);
        assert_eq!(analysis.avg_wind_speed, 20.0);
        assert_eq!(analysis.max_gust, 40.0);
        assert_eq!(analysis.date_analyzed, "2026-02-05 to 2026-02-06");
        assert_eq!(analysis.source, BucketMode::Stored);
    }

    #[test]
    fn test_live_mode_omits_empty_buckets() {
        let samples = vec![sample(5, 10.0, 180.0, None), sample(5, 12.0, 0.0, None)];
        let analysis = analyze_samples(&samples, BucketMode::LiveFetch, 3).unwrap();

        assert_eq!(analysis.direction_stats.len(), 2);
        // tie: N precedes S in scan order
        assert_eq!(analysis.dominant_direction, Cardinal::N);
        assert_eq!(analysis.direction_stats[1].direction, Cardinal::S);
        assert_eq!(analysis.direction_stats[1].max_gust, 0.0);
    }

    #[test]
    fn test_percentages_sum_to_one_hundred() {
        let directions = [0.0, 10.0, 50.0, 95.0, 140.0, 181.0, 230.0, 260.0, 300.0, 330.0, 359.0];
        let samples: Vec<WindSample> = directions
            .iter()
            .enumerate()
            .map(|(i, d)| sample(1 + u32::try_from(i % 3).unwrap(), 8.0, *d, None))
            .collect();
        let analysis = analyze_samples(&samples, BucketMode::Stored, 7).unwrap();
        let sum: f64 = analysis.direction_stats.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.8, "sum was {sum}");
    }

    #[test]
    fn test_lee_slopes_skip_empty_buckets() {
        let samples = vec![sample(5, 10.0, 45.0, None)];
        let analysis = analyze_samples(&samples, BucketMode::Stored, 7).unwrap();
        assert_eq!(analysis.top_directions(3), vec![Cardinal::NE]);
        assert_eq!(analysis.lee_slopes(3), vec![Cardinal::SW]);
    }

    #[test]
    fn test_stored_hours_missing_speed_or_direction_are_excluded() {
        let hours = vec![
            StoredHour {
                wind_speed: Some(10.0),
                wind_direction: Some(90.0),
                ..StoredHour::default()
            },
            StoredHour {
                wind_speed: None,
                wind_direction: Some(270.0),
                ..StoredHour::default()
            },
            StoredHour {
                wind_speed: Some(50.0),
                wind_direction: None,
                ..StoredHour::default()
            },
        ];
        let days = vec![
            (date(3), DailyRecordFile::Bare(hours)),
            (date(4), DailyRecordFile::Wrapped { data: vec![] }),
        ];
        let analysis = analyze_stored(&days, 7).unwrap();
        assert_eq!(analysis.total_hours, 1);
        assert_eq!(analysis.avg_wind_speed, 10.0);
        assert_eq!(analysis.days_found, 1);
        assert_eq!(analysis.date_analyzed, "2026-02-03 to 2026-02-03");
    }
}

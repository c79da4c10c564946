//! Aggregates 1-minute candles into coarser timeframes

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{Candle, Timeframe};

/// Service for aggregating candle data into coarser timeframes
pub struct Aggregator;

impl Aggregator {
    /// Aggregate 1-minute candles into the target timeframe.
    ///
    /// Buckets are labeled by their start time; only buckets that contain
    /// source rows are emitted. Within a bucket: open = first, close =
    /// last, high = max, low = min, volume = sum.
    pub fn aggregate(data: Vec<Candle>, timeframe: Timeframe) -> Vec<Candle> {
        if data.is_empty() {
            return vec![];
        }
        if timeframe == Timeframe::Minute1 {
            debug!("Aggregation into the base timeframe is a no-op");
            return data;
        }

        debug!(
            records = data.len(),
            timeframe = %timeframe,
            "Aggregating minute records"
        );

        // BTreeMap keeps buckets in chronological order
        let mut buckets: BTreeMap<DateTime<Utc>, Vec<Candle>> = BTreeMap::new();
        for candle in data {
            let bucket_time = Self::bucket_time(candle.time, timeframe);
            buckets.entry(bucket_time).or_default().push(candle);
        }

        let result: Vec<Candle> = buckets
            .into_iter()
            .map(|(bucket_time, records)| Self::aggregate_bucket(records, bucket_time))
            .collect();

        debug!(buckets = result.len(), "Aggregation complete");
        result
    }

    /// Bucket start time for a candle timestamp.
    pub fn bucket_time(time: DateTime<Utc>, timeframe: Timeframe) -> DateTime<Utc> {
        match timeframe {
            Timeframe::Minute1 => time,
            Timeframe::Minute5 => Self::bucket_minute(time, 5),
            Timeframe::Minute30 => Self::bucket_minute(time, 30),
            Timeframe::Hour1 => Self::bucket_hour(time),
            Timeframe::Day1 => Self::bucket_day(time),
            Timeframe::Week1 => Self::bucket_week(time),
        }
    }

    /// Round down to the nearest bucket boundary within the hour.
    fn bucket_minute(time: DateTime<Utc>, bucket_minutes: i64) -> DateTime<Utc> {
        let minutes_since_hour = time.minute() as i64;
        let bucket_start_minute = (minutes_since_hour / bucket_minutes) * bucket_minutes;

        Utc.with_ymd_and_hms(
            time.year(),
            time.month(),
            time.day(),
            time.hour(),
            bucket_start_minute as u32,
            0,
        )
        .unwrap()
    }

    fn bucket_hour(time: DateTime<Utc>) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(time.year(), time.month(), time.day(), time.hour(), 0, 0)
            .unwrap()
    }

    fn bucket_day(time: DateTime<Utc>) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(time.year(), time.month(), time.day(), 0, 0, 0)
            .unwrap()
    }

    /// Week bucket start (Monday 00:00:00, ISO 8601 weeks).
    fn bucket_week(time: DateTime<Utc>) -> DateTime<Utc> {
        let days_from_monday = time.weekday().num_days_from_monday();

        let monday = if days_from_monday == 0 {
            time.date_naive()
        } else {
            time.date_naive() - Duration::days(days_from_monday as i64)
        };

        Utc.from_utc_datetime(&monday.and_hms_opt(0, 0, 0).unwrap())
    }

    /// Aggregate OHLCV for one time bucket.
    fn aggregate_bucket(mut records: Vec<Candle>, bucket_time: DateTime<Utc>) -> Candle {
        // Sort by time to ensure first/last are correct
        records.sort_by_key(|r| r.time);

        let open = records[0].open;
        let close = records[records.len() - 1].close;
        let high = records.iter().map(|r| r.high).fold(f64::NEG_INFINITY, f64::max);
        let low = records.iter().map(|r| r.low).fold(f64::INFINITY, f64::min);
        let volume = records.iter().map(|r| r.volume).sum();

        Candle {
            time: bucket_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

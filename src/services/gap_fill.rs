//! Gap filling for 1-minute data
//!
//! Minutes the exchange had no trade for are represented explicitly:
//! the previous candle's prices are carried forward with zero volume, so
//! every year file covers its full span at exact 60-second cadence.

use chrono::{Datelike, TimeZone, Utc};
use tracing::{debug, info};

use crate::constants::MINUTE_SECS;
use crate::error::{Error, Result};
use crate::models::{Asset, Candle, Timeframe};
use crate::services::store::DataStore;

/// Fill every missing minute in `[start_unix, end_unix)`.
///
/// Input candles are deduplicated by timestamp (first wins) and candles
/// outside the span are dropped. When a gap precedes any real candle and
/// no `seed` is given, all-zero placeholder rows are emitted.
pub fn fill_minute_gaps(
    candles: Vec<Candle>,
    start_unix: i64,
    end_unix: i64,
    seed: Option<&Candle>,
) -> Vec<Candle> {
    let mut sorted = candles;
    sorted.sort_by_key(|c| c.time);
    sorted.retain(|c| c.unix() >= start_unix && c.unix() < end_unix);
    sorted.dedup_by_key(|c| c.unix());

    let expected_len = ((end_unix - start_unix) / MINUTE_SECS).max(0) as usize;
    let mut filled = Vec::with_capacity(expected_len);
    let mut last: Option<Candle> = seed.cloned();
    let mut idx = 0;
    let mut synthetic = 0usize;

    let mut expected = start_unix;
    while expected < end_unix {
        if idx < sorted.len() && sorted[idx].unix() == expected {
            last = Some(sorted[idx].clone());
            filled.push(sorted[idx].clone());
            idx += 1;
        } else {
            let time = match Utc.timestamp_opt(expected, 0).single() {
                Some(t) => t,
                None => break,
            };
            let candle = match &last {
                Some(prev) => prev.carry_forward(time),
                None => Candle::zero(time),
            };
            filled.push(candle);
            synthetic += 1;
        }
        expected += MINUTE_SECS;
    }

    if synthetic > 0 {
        debug!(synthetic, total = filled.len(), "Plugged missing minutes");
    }

    filled
}

/// Report of one inserted year-boundary row.
#[derive(Debug)]
pub struct BoundaryFill {
    pub year: i32,
    pub inserted_unix: i64,
}

/// Insert the first minute of a year when it is missing and the previous
/// year's file is available to carry prices from.
pub fn fill_year_boundaries(store: &DataStore, asset: Asset) -> Result<Vec<BoundaryFill>> {
    let years = store.list_year_files(asset, Timeframe::Minute1)?;
    let mut fills = Vec::new();

    for pair in years.windows(2) {
        let (prev_year, prev_path) = &pair[0];
        let (year, path) = &pair[1];
        if *year != prev_year + 1 {
            continue;
        }

        let candles = store.read_candles(path)?;
        let first = match candles.first() {
            Some(c) => c,
            None => continue,
        };

        let year_start = Utc
            .with_ymd_and_hms(*year, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| Error::Other(format!("Bad year: {}", year)))?;
        if first.time <= year_start {
            continue;
        }

        let prev_candles = store.read_candles(prev_path)?;
        let source = match prev_candles.last() {
            Some(c) => c,
            None => continue,
        };

        let mut patched = Vec::with_capacity(candles.len() + 1);
        patched.push(source.carry_forward(year_start));
        patched.extend(candles);
        store.write_candles(path, &patched)?;

        info!(
            asset = %asset,
            year,
            source_year = prev_year,
            "Inserted missing first minute of year"
        );
        fills.push(BoundaryFill {
            year: *year,
            inserted_unix: year_start.timestamp(),
        });
    }

    Ok(fills)
}

/// Calendar year of a candle, used when splitting files.
pub fn candle_year(candle: &Candle) -> i32 {
    candle.time.year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn minute(base: DateTime<Utc>, offset: i64) -> DateTime<Utc> {
        base + chrono::Duration::minutes(offset)
    }

    fn flat_candle(time: DateTime<Utc>, price: f64, volume: f64) -> Candle {
        Candle::new(time, price, price + 1.0, price - 1.0, price, volume)
    }

    #[test]
    fn test_interior_gap_carries_prices_with_zero_volume() {
        let base = Utc.with_ymd_and_hms(2021, 6, 1, 10, 0, 0).unwrap();
        let candles = vec![
            flat_candle(minute(base, 0), 100.0, 5.0),
            // minutes 1 and 2 missing
            flat_candle(minute(base, 3), 104.0, 2.0),
        ];

        let filled = fill_minute_gaps(candles, base.timestamp(), minute(base, 4).timestamp(), None);
        assert_eq!(filled.len(), 4);
        assert_eq!(filled[1].time, minute(base, 1));
        assert_eq!(filled[1].close, 100.0);
        assert_eq!(filled[1].high, 101.0);
        assert_eq!(filled[1].volume, 0.0);
        assert_eq!(filled[2].close, 100.0);
        assert_eq!(filled[3].close, 104.0);
        assert_eq!(filled[3].volume, 2.0);
    }

    #[test]
    fn test_leading_gap_without_seed_is_zero_rows() {
        let base = Utc.with_ymd_and_hms(2021, 6, 1, 10, 0, 0).unwrap();
        let candles = vec![flat_candle(minute(base, 2), 100.0, 5.0)];

        let filled = fill_minute_gaps(candles, base.timestamp(), minute(base, 3).timestamp(), None);
        assert_eq!(filled.len(), 3);
        assert_eq!(filled[0], Candle::zero(base));
        assert_eq!(filled[1], Candle::zero(minute(base, 1)));
        assert_eq!(filled[2].close, 100.0);
    }

    #[test]
    fn test_leading_gap_with_seed_carries_seed() {
        let base = Utc.with_ymd_and_hms(2021, 6, 1, 10, 0, 0).unwrap();
        let seed = flat_candle(minute(base, -1), 99.0, 7.0);
        let candles = vec![flat_candle(minute(base, 1), 100.0, 5.0)];

        let filled = fill_minute_gaps(
            candles,
            base.timestamp(),
            minute(base, 2).timestamp(),
            Some(&seed),
        );
        assert_eq!(filled.len(), 2);
        assert_eq!(filled[0].close, 99.0);
        assert_eq!(filled[0].volume, 0.0);
        assert_eq!(filled[1].close, 100.0);
    }

    #[test]
    fn test_duplicate_timestamps_keep_first() {
        let base = Utc.with_ymd_and_hms(2021, 6, 1, 10, 0, 0).unwrap();
        let candles = vec![
            flat_candle(minute(base, 0), 100.0, 5.0),
            flat_candle(minute(base, 0), 200.0, 9.0),
        ];

        let filled = fill_minute_gaps(candles, base.timestamp(), minute(base, 1).timestamp(), None);
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].close, 100.0);
    }

    #[test]
    fn test_year_boundary_fill() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let prev_last = Utc.with_ymd_and_hms(2020, 12, 31, 23, 59, 0).unwrap();
        store
            .write_candles(
                &store.year_file(Asset::Btc, Timeframe::Minute1, 2020),
                &[flat_candle(prev_last, 29000.0, 4.0)],
            )
            .unwrap();

        // 2021 starts one minute late
        let late_first = Utc.with_ymd_and_hms(2021, 1, 1, 0, 1, 0).unwrap();
        let path_2021 = store.year_file(Asset::Btc, Timeframe::Minute1, 2021);
        store
            .write_candles(&path_2021, &[flat_candle(late_first, 29100.0, 2.0)])
            .unwrap();

        let fills = fill_year_boundaries(&store, Asset::Btc).unwrap();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].year, 2021);

        let patched = store.read_candles(&path_2021).unwrap();
        assert_eq!(patched.len(), 2);
        assert_eq!(
            patched[0].time,
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(patched[0].close, 29000.0);
        assert_eq!(patched[0].volume, 0.0);
        assert_eq!(patched[1].close, 29100.0);

        // second run is a no-op
        let fills = fill_year_boundaries(&store, Asset::Btc).unwrap();
        assert!(fills.is_empty());
    }
}

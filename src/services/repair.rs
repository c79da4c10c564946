//! Missing-range repair
//!
//! When a 1-minute year file fails cadence validation, the missing ranges
//! are fetched from Binance, gap-filled, merged into the original file
//! (keeping the first occurrence of any duplicate timestamp) and the file
//! is rewritten and re-validated.

use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::{BINANCE_DELAY_MS, MINUTE_SECS};
use crate::error::Result;
use crate::models::{Asset, Candle, Timeframe};
use crate::services::binance::BinanceClient;
use crate::services::gap_fill::fill_minute_gaps;
use crate::services::validator::{self, ValidationReport};
use crate::services::store;

/// Outcome of repairing one file.
#[derive(Debug)]
pub struct RepairOutcome {
    /// Ranges the file was missing before repair
    pub ranges: usize,
    /// Candles fetched from Binance
    pub fetched: usize,
    /// Rows in the rewritten file
    pub rows: usize,
    /// Validation state after the rewrite
    pub report: ValidationReport,
}

/// Repair one 1-minute file in place.
pub async fn repair_file(
    client: &BinanceClient,
    asset: Asset,
    path: &Path,
) -> Result<RepairOutcome> {
    let before = validator::validate_file(path, Timeframe::Minute1)?;
    if before.is_clean() {
        return Ok(RepairOutcome {
            ranges: 0,
            fetched: 0,
            rows: before.rows,
            report: before,
        });
    }

    let ranges = validator::missing_ranges(&before.missing);
    info!(
        path = %path.display(),
        missing = before.missing.len(),
        ranges = ranges.len(),
        "Repairing missing data from Binance"
    );

    let mut original = store::read_candles(path)?;
    original.sort_by_key(|c| c.time);

    let mut fetched_total = 0;
    let mut patches: Vec<Candle> = Vec::new();

    for (idx, &(start, end)) in ranges.iter().enumerate() {
        let fetched = match client.fetch_range(asset.binance_symbol(), start, end).await {
            Ok(candles) => candles,
            Err(e) => {
                // Keep going; remaining holes surface in the final report
                warn!(start, end, error = %e, "Failed to fetch missing range");
                continue;
            }
        };
        fetched_total += fetched.len();

        // Carry the last candle before the range into any residual holes
        let seed = last_before(&original, start);
        let filled = fill_minute_gaps(fetched, start, end + MINUTE_SECS, seed);
        patches.extend(filled);

        if idx + 1 < ranges.len() {
            tokio::time::sleep(Duration::from_millis(BINANCE_DELAY_MS)).await;
        }
    }

    let (merged, removed) = merge_candles(original, patches);
    if removed > 0 {
        info!(removed, "Dropped duplicate timestamps during merge");
    }

    store::write_candles(path, &merged)?;

    let report = validator::validate_file(path, Timeframe::Minute1)?;
    Ok(RepairOutcome {
        ranges: ranges.len(),
        fetched: fetched_total,
        rows: merged.len(),
        report,
    })
}

/// Last candle strictly before `unix`, assuming `candles` is sorted.
fn last_before(candles: &[Candle], unix: i64) -> Option<&Candle> {
    match candles.binary_search_by_key(&unix, |c| c.unix()) {
        Ok(0) | Err(0) => None,
        Ok(i) | Err(i) => Some(&candles[i - 1]),
    }
}

/// Merge two candle sets, sorted by timestamp, keeping the first
/// occurrence of any duplicate. Returns the merged set and the number of
/// duplicates dropped.
pub fn merge_candles(original: Vec<Candle>, extra: Vec<Candle>) -> (Vec<Candle>, usize) {
    let mut all = original;
    all.extend(extra);
    // Stable sort keeps original rows ahead of patches at equal timestamps
    all.sort_by_key(|c| c.time);

    let before = all.len();
    all.dedup_by_key(|c| c.unix());
    let removed = before - all.len();

    (all, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle_at(offset: i64, close: f64) -> Candle {
        let base = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let time = base + chrono::Duration::minutes(offset);
        Candle::new(time, close, close + 1.0, close - 1.0, close, 1.0)
    }

    #[test]
    fn test_merge_sorts_and_keeps_first() {
        let original = vec![candle_at(0, 100.0), candle_at(2, 102.0)];
        let extra = vec![candle_at(1, 101.0), candle_at(2, 999.0)];

        let (merged, removed) = merge_candles(original, extra);
        assert_eq!(removed, 1);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].close, 100.0);
        assert_eq!(merged[1].close, 101.0);
        // original row wins over the patch at the same timestamp
        assert_eq!(merged[2].close, 102.0);
    }

    #[test]
    fn test_last_before() {
        let candles = vec![candle_at(0, 100.0), candle_at(1, 101.0), candle_at(5, 105.0)];
        let base = candles[0].unix();

        assert!(last_before(&candles, base).is_none());
        assert_eq!(last_before(&candles, base + 60).map(|c| c.close), Some(100.0));
        // timestamp inside the gap
        assert_eq!(
            last_before(&candles, base + 180).map(|c| c.close),
            Some(101.0)
        );
        assert_eq!(
            last_before(&candles, base + 3600).map(|c| c.close),
            Some(105.0)
        );
    }
}

//! Dataset integrity checks
//!
//! Every file must carry the documented header and at least one row, keep
//! `low <= min(open, close)`, `high >= max(open, close)` and
//! `volume >= 0` per row, and keep `unix_timestamp` strictly increasing.
//! 1-minute files must additionally cover every 60-second step between
//! their first and last row.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::{CSV_HEADER, MINUTE_SECS};
use crate::error::Result;
use crate::models::{Candle, Timeframe};
use crate::services::aggregator::Aggregator;
use crate::services::store;

/// Integrity report for one candle file.
#[derive(Debug)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub rows: usize,
    pub header_ok: bool,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    /// Missing timestamps (1-minute cadence files only)
    pub missing: Vec<i64>,
    /// Duplicated timestamps
    pub duplicates: Vec<i64>,
    /// Pairs where time did not strictly increase
    pub time_reversals: usize,
    /// Rows violating low <= min(open, close) <= max(open, close) <= high
    pub price_violations: usize,
    /// Rows with negative volume
    pub negative_volume: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.header_ok
            && self.rows > 0
            && self.missing.is_empty()
            && self.duplicates.is_empty()
            && self.time_reversals == 0
            && self.price_violations == 0
            && self.negative_volume == 0
    }

    /// One-line summary for command output.
    pub fn summary(&self) -> String {
        if self.is_clean() {
            format!("{} rows, complete", self.rows)
        } else {
            let mut issues = Vec::new();
            if !self.header_ok {
                issues.push("bad header".to_string());
            }
            if self.rows == 0 {
                issues.push("empty".to_string());
            }
            if !self.missing.is_empty() {
                issues.push(format!("{} missing", self.missing.len()));
            }
            if !self.duplicates.is_empty() {
                issues.push(format!("{} duplicates", self.duplicates.len()));
            }
            if self.time_reversals > 0 {
                issues.push(format!("{} time reversals", self.time_reversals));
            }
            if self.price_violations > 0 {
                issues.push(format!("{} price violations", self.price_violations));
            }
            if self.negative_volume > 0 {
                issues.push(format!("{} negative volumes", self.negative_volume));
            }
            format!("{} rows, {}", self.rows, issues.join(", "))
        }
    }
}

/// Validate a single candle file for the given timeframe.
pub fn validate_file(path: &Path, timeframe: Timeframe) -> Result<ValidationReport> {
    let header = store::read_header(path)?;
    let header_ok = header == CSV_HEADER;
    if !header_ok {
        warn!(path = %path.display(), ?header, "Header does not match documented column order");
    }

    let candles = store::read_candles(path)?;
    let report = validate_candles(path, &candles, timeframe, header_ok);

    if report.is_clean() {
        info!(path = %path.display(), rows = report.rows, "Validation passed");
    } else {
        warn!(path = %path.display(), summary = %report.summary(), "Validation failed");
    }

    Ok(report)
}

/// Validation core, shared with in-memory callers (repair re-checks).
pub fn validate_candles(
    path: &Path,
    candles: &[Candle],
    timeframe: Timeframe,
    header_ok: bool,
) -> ValidationReport {
    let mut report = ValidationReport {
        path: path.to_path_buf(),
        rows: candles.len(),
        header_ok,
        first: candles.first().map(|c| c.time),
        last: candles.last().map(|c| c.time),
        missing: Vec::new(),
        duplicates: Vec::new(),
        time_reversals: 0,
        price_violations: 0,
        negative_volume: 0,
    };

    for candle in candles {
        if !candle.prices_consistent() {
            report.price_violations += 1;
        }
        if candle.volume < 0.0 {
            report.negative_volume += 1;
        }
    }

    if let Some(step) = timeframe.fixed_step_secs() {
        // Cadence check over sorted timestamps, as the data may be unsorted
        let mut timestamps: Vec<i64> = candles.iter().map(|c| c.unix()).collect();
        timestamps.sort_unstable();

        let mut expected = match timestamps.first() {
            Some(first) => *first,
            None => return report,
        };
        let mut prev: Option<i64> = None;

        for &ts in &timestamps {
            if prev == Some(ts) {
                report.duplicates.push(ts);
                continue;
            }
            while expected < ts {
                report.missing.push(expected);
                expected += step;
            }
            if expected == ts {
                expected += step;
            }
            prev = Some(ts);
        }
    } else {
        for pair in candles.windows(2) {
            let (a, b) = (pair[0].unix(), pair[1].unix());
            if b == a {
                report.duplicates.push(b);
            } else if b < a {
                report.time_reversals += 1;
            }
        }
    }

    report
}

/// Group missing timestamps into inclusive `(start, end)` ranges of
/// consecutive minutes, for efficient refetching.
pub fn missing_ranges(missing: &[i64]) -> Vec<(i64, i64)> {
    let mut ranges = Vec::new();
    let mut iter = missing.iter();

    let first = match iter.next() {
        Some(ts) => *ts,
        None => return ranges,
    };
    let mut start = first;
    let mut end = first;

    for &ts in iter {
        if ts == end + MINUTE_SECS {
            end = ts;
        } else {
            ranges.push((start, end));
            start = ts;
            end = ts;
        }
    }
    ranges.push((start, end));

    ranges
}

/// Result of checking an aggregated file against its 1-minute source.
#[derive(Debug)]
pub struct ConsistencyReport {
    pub buckets_checked: usize,
    /// Bucket start times whose OHLCV disagrees with re-aggregation
    pub mismatches: Vec<DateTime<Utc>>,
    /// Buckets present in only one of the two series
    pub unmatched: usize,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty() && self.unmatched == 0
    }
}

/// Verify that `aggregated` equals re-aggregating `base` into `timeframe`.
///
/// Volume sums tolerate float accumulation error; prices must match
/// exactly since aggregation only selects or compares them.
pub fn verify_aggregation(
    base: &[Candle],
    aggregated: &[Candle],
    timeframe: Timeframe,
) -> ConsistencyReport {
    let expected = Aggregator::aggregate(base.to_vec(), timeframe);

    let mut report = ConsistencyReport {
        buckets_checked: 0,
        mismatches: Vec::new(),
        unmatched: 0,
    };

    let mut expected_iter = expected.iter().peekable();
    let mut actual_iter = aggregated.iter().peekable();

    loop {
        match (expected_iter.peek(), actual_iter.peek()) {
            (Some(exp), Some(act)) => {
                if exp.time < act.time {
                    report.unmatched += 1;
                    expected_iter.next();
                } else if act.time < exp.time {
                    report.unmatched += 1;
                    actual_iter.next();
                } else {
                    report.buckets_checked += 1;
                    if !buckets_match(exp, act) {
                        report.mismatches.push(exp.time);
                    }
                    expected_iter.next();
                    actual_iter.next();
                }
            }
            (Some(_), None) | (None, Some(_)) => {
                report.unmatched += 1;
                expected_iter.next();
                actual_iter.next();
            }
            (None, None) => break,
        }
    }

    report
}

fn buckets_match(expected: &Candle, actual: &Candle) -> bool {
    const VOLUME_TOLERANCE: f64 = 1e-6;
    expected.open == actual.open
        && expected.high == actual.high
        && expected.low == actual.low
        && expected.close == actual.close
        && (expected.volume - actual.volume).abs() <= VOLUME_TOLERANCE * expected.volume.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn minute_candle(offset: i64, close: f64) -> Candle {
        let base = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let time = base + chrono::Duration::minutes(offset);
        Candle::new(time, close, close + 1.0, close - 1.0, close, 1.0)
    }

    #[test]
    fn test_detects_missing_and_duplicate_minutes() {
        let candles = vec![
            minute_candle(0, 100.0),
            minute_candle(1, 101.0),
            minute_candle(1, 101.5), // duplicate
            minute_candle(4, 104.0), // minutes 2 and 3 missing
        ];

        let report = validate_candles(
            Path::new("2021.csv"),
            &candles,
            Timeframe::Minute1,
            true,
        );
        assert!(!report.is_clean());
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.missing.len(), 2);

        let base = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap().timestamp();
        assert_eq!(report.missing, vec![base + 120, base + 180]);
    }

    #[test]
    fn test_clean_minute_file() {
        let candles: Vec<Candle> = (0..5).map(|i| minute_candle(i, 100.0 + i as f64)).collect();
        let report = validate_candles(Path::new("2021.csv"), &candles, Timeframe::Minute1, true);
        assert!(report.is_clean());
        assert_eq!(report.rows, 5);
    }

    #[test]
    fn test_price_and_volume_violations() {
        let base = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let candles = vec![
            // high below close
            Candle::new(base, 100.0, 100.5, 99.0, 101.0, 1.0),
            // negative volume
            Candle::new(
                base + chrono::Duration::minutes(1),
                100.0,
                101.0,
                99.0,
                100.0,
                -2.0,
            ),
        ];

        let report = validate_candles(Path::new("2021.csv"), &candles, Timeframe::Minute1, true);
        assert_eq!(report.price_violations, 1);
        assert_eq!(report.negative_volume, 1);
    }

    #[test]
    fn test_aggregated_frames_require_strict_increase_only() {
        let base = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        // hourly rows with a day gap in between: fine
        let candles = vec![
            Candle::new(base, 100.0, 101.0, 99.0, 100.0, 1.0),
            Candle::new(base + chrono::Duration::days(1), 100.0, 101.0, 99.0, 100.0, 1.0),
        ];
        let report = validate_candles(Path::new("full.csv"), &candles, Timeframe::Hour1, true);
        assert!(report.is_clean());

        // out-of-order rows are not
        let reversed: Vec<Candle> = candles.iter().rev().cloned().collect();
        let report = validate_candles(Path::new("full.csv"), &reversed, Timeframe::Hour1, true);
        assert_eq!(report.time_reversals, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_missing_ranges_groups_consecutive() {
        let base = 1_600_000_020; // any minute-aligned-ish base works for grouping
        let missing = vec![
            base,
            base + 60,
            base + 120,
            base + 300,
            base + 600,
            base + 660,
        ];
        let ranges = missing_ranges(&missing);
        assert_eq!(
            ranges,
            vec![
                (base, base + 120),
                (base + 300, base + 300),
                (base + 600, base + 660),
            ]
        );
    }

    #[test]
    fn test_missing_ranges_empty() {
        assert!(missing_ranges(&[]).is_empty());
    }

    #[test]
    fn test_verify_aggregation_consistent() {
        let base: Vec<Candle> = (0..10).map(|i| minute_candle(i, 100.0 + i as f64)).collect();
        let aggregated = Aggregator::aggregate(base.clone(), Timeframe::Minute5);

        let report = verify_aggregation(&base, &aggregated, Timeframe::Minute5);
        assert!(report.is_consistent());
        assert_eq!(report.buckets_checked, 2);
    }

    #[test]
    fn test_verify_aggregation_detects_drift() {
        let base: Vec<Candle> = (0..10).map(|i| minute_candle(i, 100.0 + i as f64)).collect();
        let mut aggregated = Aggregator::aggregate(base.clone(), Timeframe::Minute5);
        aggregated[1].close += 5.0;

        let report = verify_aggregation(&base, &aggregated, Timeframe::Minute5);
        assert!(!report.is_consistent());
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0], aggregated[1].time);
    }

    #[test]
    fn test_verify_aggregation_detects_missing_bucket() {
        let base: Vec<Candle> = (0..10).map(|i| minute_candle(i, 100.0)).collect();
        let mut aggregated = Aggregator::aggregate(base.clone(), Timeframe::Minute5);
        aggregated.pop();

        let report = verify_aggregation(&base, &aggregated, Timeframe::Minute5);
        assert!(!report.is_consistent());
        assert_eq!(report.unmatched, 1);
    }
}

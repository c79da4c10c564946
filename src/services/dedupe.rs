//! Duplicate-row removal for year files
//!
//! Keeps the first row for each `unix_timestamp`. When anything was
//! removed, the original file is kept as a `.backup` sibling.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Asset, Timeframe};
use crate::services::store::{self, DataStore};

/// Result of deduplicating one file.
#[derive(Debug)]
pub struct DedupeReport {
    pub path: PathBuf,
    pub total_rows: usize,
    pub removed: usize,
}

/// Remove duplicate timestamps from a single file, keeping the first
/// occurrence. Row order is otherwise preserved.
pub fn dedupe_file(path: &Path) -> Result<DedupeReport> {
    let candles = store::read_candles(path)?;
    let total_rows = candles.len();

    let mut seen: HashSet<i64> = HashSet::with_capacity(total_rows);
    let mut unique = Vec::with_capacity(total_rows);
    for candle in candles {
        if seen.insert(candle.unix()) {
            unique.push(candle);
        }
    }

    let removed = total_rows - unique.len();
    if removed > 0 {
        let backup = backup_path(path);
        std::fs::rename(path, &backup).map_err(|e| {
            Error::Io(format!(
                "Failed to back up {} to {}: {}",
                path.display(),
                backup.display(),
                e
            ))
        })?;
        store::write_candles(path, &unique)?;
        info!(
            path = %path.display(),
            removed,
            backup = %backup.display(),
            "Removed duplicate rows"
        );
    }

    Ok(DedupeReport {
        path: path.to_path_buf(),
        total_rows,
        removed,
    })
}

/// Deduplicate every year file of an asset's 1-minute data.
pub fn dedupe_all_years(store: &DataStore, asset: Asset) -> Result<Vec<DedupeReport>> {
    let mut reports = Vec::new();
    for (_, path) in store.list_year_files(asset, Timeframe::Minute1)? {
        reports.push(dedupe_file(&path)?);
    }
    Ok(reports)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use chrono::{TimeZone, Utc};

    fn candle_at(offset: i64, close: f64) -> Candle {
        let base = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let time = base + chrono::Duration::minutes(offset);
        Candle::new(time, close, close + 1.0, close - 1.0, close, 1.0)
    }

    #[test]
    fn test_dedupe_keeps_first_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2021.csv");
        let candles = vec![
            candle_at(0, 100.0),
            candle_at(1, 101.0),
            candle_at(1, 999.0),
            candle_at(2, 102.0),
        ];
        store::write_candles(&path, &candles).unwrap();

        let report = dedupe_file(&path).unwrap();
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.removed, 1);

        let deduped = store::read_candles(&path).unwrap();
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[1].close, 101.0);

        let backup = dir.path().join("2021.csv.backup");
        assert!(backup.exists());
        assert_eq!(store::read_candles(&backup).unwrap().len(), 4);
    }

    #[test]
    fn test_dedupe_clean_file_leaves_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2021.csv");
        let candles = vec![candle_at(0, 100.0), candle_at(1, 101.0)];
        store::write_candles(&path, &candles).unwrap();

        let report = dedupe_file(&path).unwrap();
        assert_eq!(report.removed, 0);
        assert!(!dir.path().join("2021.csv.backup").exists());
        assert_eq!(store::read_candles(&path).unwrap(), candles);
    }
}

//! CSV store for the candle dataset
//!
//! Files live at `data/<asset>/<timeframe>/<year-or-full>.csv` with the
//! column order `timestamp,open,close,volume,unix_timestamp,high,low`.
//! `unix_timestamp` is the time source of truth; the `timestamp` column
//! is the same instant rendered for humans.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::TIMESTAMP_FORMAT;
use crate::error::{Error, Result};
use crate::models::{Asset, Candle, Timeframe};

/// One CSV record in the on-disk column order.
#[derive(Debug, Serialize, Deserialize)]
pub struct CandleRow {
    pub timestamp: String,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
    pub unix_timestamp: i64,
    pub high: f64,
    pub low: f64,
}

impl From<&Candle> for CandleRow {
    fn from(candle: &Candle) -> Self {
        Self {
            timestamp: candle.time.format(TIMESTAMP_FORMAT).to_string(),
            open: candle.open,
            close: candle.close,
            volume: candle.volume,
            unix_timestamp: candle.unix(),
            high: candle.high,
            low: candle.low,
        }
    }
}

impl TryFrom<CandleRow> for Candle {
    type Error = Error;

    fn try_from(row: CandleRow) -> Result<Candle> {
        let time = Utc
            .timestamp_opt(row.unix_timestamp, 0)
            .single()
            .ok_or_else(|| {
                Error::Parse(format!("Invalid unix_timestamp: {}", row.unix_timestamp))
            })?;

        Ok(Candle {
            time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        })
    }
}

/// Layout and IO for the dataset directory tree.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn timeframe_dir(&self, asset: Asset, timeframe: Timeframe) -> PathBuf {
        self.root.join(asset.dir_name()).join(timeframe.dir_name())
    }

    pub fn year_file(&self, asset: Asset, timeframe: Timeframe, year: i32) -> PathBuf {
        self.timeframe_dir(asset, timeframe)
            .join(format!("{}.csv", year))
    }

    pub fn full_file(&self, asset: Asset, timeframe: Timeframe) -> PathBuf {
        self.timeframe_dir(asset, timeframe).join("full.csv")
    }

    /// Per-year files of an asset/timeframe, sorted by year.
    pub fn list_year_files(
        &self,
        asset: Asset,
        timeframe: Timeframe,
    ) -> Result<Vec<(i32, PathBuf)>> {
        let dir = self.timeframe_dir(asset, timeframe);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", dir.display(), e)))?
        {
            let path = entry
                .map_err(|e| Error::Io(format!("Failed to read entry: {}", e)))?
                .path();
            if path.extension().and_then(|s| s.to_str()) != Some("csv") {
                continue;
            }
            // Year files only; full.csv and backups are skipped here
            if let Some(year) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<i32>().ok())
            {
                files.push((year, path));
            }
        }

        files.sort_by_key(|(year, _)| *year);
        Ok(files)
    }

    /// Read a candle file, preserving row order.
    pub fn read_candles(&self, path: &Path) -> Result<Vec<Candle>> {
        read_candles(path)
    }

    /// Write candles to a file, creating parent directories.
    pub fn write_candles(&self, path: &Path, candles: &[Candle]) -> Result<()> {
        write_candles(path, candles)
    }
}

pub fn read_candles(path: &Path) -> Result<Vec<Candle>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut candles = Vec::new();
    for result in reader.deserialize::<CandleRow>() {
        let row = result
            .map_err(|e| Error::Parse(format!("Bad row in {}: {}", path.display(), e)))?;
        candles.push(Candle::try_from(row)?);
    }

    Ok(candles)
}

pub fn write_candles(path: &Path, candles: &[Candle]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::Io(format!("Failed to create {}: {}", path.display(), e)))?;

    for candle in candles {
        writer.serialize(CandleRow::from(candle))?;
    }

    writer
        .flush()
        .map_err(|e| Error::Io(format!("Failed to flush {}: {}", path.display(), e)))?;
    Ok(())
}

/// Read only the header row of a candle file.
pub fn read_header(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Io(format!("Failed to open {}: {}", path.display(), e)))?;
    let header = reader
        .headers()
        .map_err(|e| Error::Parse(format!("Bad header in {}: {}", path.display(), e)))?;
    Ok(header.iter().map(|s| s.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CSV_HEADER;
    use chrono::TimeZone;
    use std::io::Read;

    fn sample_candles() -> Vec<Candle> {
        let t0 = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2021, 1, 1, 0, 1, 0).unwrap();
        vec![
            Candle::new(t0, 29000.0, 29100.0, 28950.0, 29050.0, 12.5),
            Candle::new(t1, 29050.0, 29075.0, 29000.0, 29025.0, 3.25),
        ]
    }

    #[test]
    fn test_layout_paths() {
        let store = DataStore::new("data");
        assert_eq!(
            store.year_file(Asset::Btc, Timeframe::Minute1, 2021),
            PathBuf::from("data/btc/1min/2021.csv")
        );
        assert_eq!(
            store.full_file(Asset::Eth, Timeframe::Hour1),
            PathBuf::from("data/eth/hourly/full.csv")
        );
    }

    #[test]
    fn test_header_matches_documented_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2021.csv");
        write_candles(&path, &sample_candles()).unwrap();

        let mut raw = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut raw)
            .unwrap();
        let first_line = raw.lines().next().unwrap();
        assert_eq!(first_line, CSV_HEADER.join(","));

        assert_eq!(read_header(&path).unwrap(), CSV_HEADER.to_vec());
    }

    #[test]
    fn test_write_then_read_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("2021.csv");
        let candles = sample_candles();

        write_candles(&path, &candles).unwrap();
        let back = read_candles(&path).unwrap();
        assert_eq!(back, candles);
    }

    #[test]
    fn test_timestamp_column_renders_unix_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2021.csv");
        write_candles(&path, &sample_candles()[..1]).unwrap();

        let mut raw = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut raw)
            .unwrap();
        let row = raw.lines().nth(1).unwrap();
        assert!(row.starts_with("2021-01-01 00:00:00,"));
        assert!(row.contains(",1609459200,"));
    }

    #[test]
    fn test_list_year_files_skips_full_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let candles = sample_candles();

        store
            .write_candles(&store.year_file(Asset::Btc, Timeframe::Minute1, 2022), &candles)
            .unwrap();
        store
            .write_candles(&store.year_file(Asset::Btc, Timeframe::Minute1, 2021), &candles)
            .unwrap();
        store
            .write_candles(&store.full_file(Asset::Btc, Timeframe::Minute1), &candles)
            .unwrap();

        let years: Vec<i32> = store
            .list_year_files(Asset::Btc, Timeframe::Minute1)
            .unwrap()
            .into_iter()
            .map(|(year, _)| year)
            .collect();
        assert_eq!(years, vec![2021, 2022]);
    }
}

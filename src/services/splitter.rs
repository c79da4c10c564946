//! Yearly split and combine
//!
//! `split_full_by_year` breaks a timeframe's `full.csv` into per-year
//! files; `combine_years` concatenates per-year files back into
//! `full.csv`, sorted and duplicate-free.

use chrono::Datelike;
use std::collections::BTreeMap;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Asset, Candle, Timeframe};
use crate::services::repair::merge_candles;
use crate::services::store::DataStore;

/// Split `full.csv` into per-year files. Returns `(year, rows)` pairs.
pub fn split_full_by_year(
    store: &DataStore,
    asset: Asset,
    timeframe: Timeframe,
) -> Result<Vec<(i32, usize)>> {
    let full_path = store.full_file(asset, timeframe);
    if !full_path.exists() {
        return Err(Error::NotFound(format!(
            "No full file at {}",
            full_path.display()
        )));
    }

    let candles = store.read_candles(&full_path)?;

    let mut by_year: BTreeMap<i32, Vec<Candle>> = BTreeMap::new();
    for candle in candles {
        by_year.entry(candle.time.year()).or_default().push(candle);
    }

    let mut written = Vec::new();
    for (year, year_candles) in by_year {
        let path = store.year_file(asset, timeframe, year);
        store.write_candles(&path, &year_candles)?;
        info!(asset = %asset, timeframe = %timeframe, year, rows = year_candles.len(), "Wrote year file");
        written.push((year, year_candles.len()));
    }

    Ok(written)
}

/// Concatenate all per-year files into `full.csv`. Returns the row count.
pub fn combine_years(store: &DataStore, asset: Asset, timeframe: Timeframe) -> Result<usize> {
    let year_files = store.list_year_files(asset, timeframe)?;
    if year_files.is_empty() {
        return Err(Error::NotFound(format!(
            "No year files under {}",
            store.timeframe_dir(asset, timeframe).display()
        )));
    }

    let mut all: Vec<Candle> = Vec::new();
    for (year, path) in &year_files {
        let candles = store.read_candles(path)?;
        info!(asset = %asset, year, rows = candles.len(), "Read year file");
        all.extend(candles);
    }

    let (merged, removed) = merge_candles(all, Vec::new());
    if removed > 0 {
        info!(removed, "Dropped duplicate timestamps while combining");
    }

    let full_path = store.full_file(asset, timeframe);
    store.write_candles(&full_path, &merged)?;
    info!(path = %full_path.display(), rows = merged.len(), "Wrote combined file");

    Ok(merged.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle_on(year: i32, month: u32, day: u32, close: f64) -> Candle {
        let time = Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap();
        Candle::new(time, close, close + 1.0, close - 1.0, close, 1.0)
    }

    #[test]
    fn test_split_then_combine_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let candles = vec![
            candle_on(2020, 3, 1, 100.0),
            candle_on(2020, 11, 30, 110.0),
            candle_on(2021, 1, 2, 120.0),
        ];
        store
            .write_candles(&store.full_file(Asset::Btc, Timeframe::Day1), &candles)
            .unwrap();

        let written = split_full_by_year(&store, Asset::Btc, Timeframe::Day1).unwrap();
        assert_eq!(written, vec![(2020, 2), (2021, 1)]);

        let y2020 = store
            .read_candles(&store.year_file(Asset::Btc, Timeframe::Day1, 2020))
            .unwrap();
        assert_eq!(y2020.len(), 2);
        assert_eq!(y2020[0].close, 100.0);

        let rows = combine_years(&store, Asset::Btc, Timeframe::Day1).unwrap();
        assert_eq!(rows, 3);
        let full = store
            .read_candles(&store.full_file(Asset::Btc, Timeframe::Day1))
            .unwrap();
        assert_eq!(full, candles);
    }

    #[test]
    fn test_split_missing_full_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        assert!(split_full_by_year(&store, Asset::Eth, Timeframe::Hour1).is_err());
    }
}

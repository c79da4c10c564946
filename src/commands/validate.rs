//! Dataset validation command
//!
//! Checks every file of the selected assets/timeframes and, where both
//! an aggregated `full.csv` and the 1-minute year files exist, verifies
//! the aggregation against its constituents.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Result;
use crate::models::{Asset, Candle, Timeframe};
use crate::services::{merge_candles, validate_file, verify_aggregation, DataStore};

pub fn run(asset: String, timeframe: String, data_dir: PathBuf) {
    let assets = super::parse_assets(&asset);
    let timeframes = parse_timeframes(&timeframe);
    let store = DataStore::new(data_dir);

    println!("🔍 Validating dataset at {}", store.root().display());

    let mut files_checked = 0;
    let mut files_failed = 0;

    for asset in assets {
        for &timeframe in &timeframes {
            match validate_timeframe(&store, asset, timeframe) {
                Ok((checked, failed)) => {
                    files_checked += checked;
                    files_failed += failed;
                }
                Err(e) => {
                    eprintln!("❌ {} {}: {}", asset, timeframe, e);
                    files_failed += 1;
                }
            }
        }
    }

    println!("{}", "=".repeat(60));
    if files_failed == 0 {
        println!("🎉 All {} files validated successfully", files_checked);
    } else {
        println!(
            "💥 {} of {} files failed validation",
            files_failed, files_checked
        );
        std::process::exit(1);
    }
}

fn parse_timeframes(arg: &str) -> Vec<Timeframe> {
    if arg.to_lowercase() == "all" {
        return Timeframe::all();
    }
    match Timeframe::from_str(arg) {
        Ok(timeframe) => vec![timeframe],
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

/// Validate every file of one asset/timeframe. Returns (checked, failed).
fn validate_timeframe(
    store: &DataStore,
    asset: Asset,
    timeframe: Timeframe,
) -> Result<(usize, usize)> {
    let mut paths: Vec<PathBuf> = store
        .list_year_files(asset, timeframe)?
        .into_iter()
        .map(|(_, path)| path)
        .collect();
    let full = store.full_file(asset, timeframe);
    if full.exists() {
        paths.push(full.clone());
    }

    if paths.is_empty() {
        return Ok((0, 0));
    }

    let mut failed = 0;
    for path in &paths {
        let report = validate_file(path, timeframe)?;
        let status = if report.is_clean() { "✅" } else { "❌" };
        println!("{} {} - {}", status, path.display(), report.summary());
        if !report.is_clean() {
            failed += 1;
        }
    }

    // Aggregation consistency against the 1-minute constituents
    if timeframe != Timeframe::Minute1 && full.exists() {
        if let Some(base) = read_minute_base(store, asset)? {
            let aggregated = store.read_candles(&full)?;
            let consistency = verify_aggregation(&base, &aggregated, timeframe);
            if consistency.is_consistent() {
                println!(
                    "✅ {} {} agrees with 1min data ({} buckets)",
                    asset,
                    timeframe,
                    consistency.buckets_checked
                );
            } else {
                println!(
                    "❌ {} {} disagrees with 1min data: {} mismatched, {} unmatched buckets",
                    asset,
                    timeframe,
                    consistency.mismatches.len(),
                    consistency.unmatched
                );
                failed += 1;
            }
        }
    }

    Ok((paths.len(), failed))
}

/// All 1-minute candles of an asset, or None when no year files exist.
fn read_minute_base(store: &DataStore, asset: Asset) -> Result<Option<Vec<Candle>>> {
    let year_files = store.list_year_files(asset, Timeframe::Minute1)?;
    if year_files.is_empty() {
        return Ok(None);
    }

    let mut all = Vec::new();
    for (_, path) in year_files {
        all.extend(store.read_candles(&path)?);
    }
    let (merged, _) = merge_candles(all, Vec::new());
    Ok(Some(merged))
}

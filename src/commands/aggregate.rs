//! Build aggregated timeframes from 1-minute data.
//!
//! Reads all per-year 1-minute files of an asset and writes one
//! `full.csv` per aggregated timeframe.

use std::path::PathBuf;

use crate::error::Result;
use crate::models::{Asset, Timeframe};
use crate::services::{merge_candles, Aggregator, DataStore};

pub fn run(asset: String, data_dir: PathBuf) {
    let assets = super::parse_assets(&asset);
    let store = DataStore::new(data_dir);

    for asset in assets {
        if let Err(e) = aggregate_asset(&store, asset) {
            eprintln!("❌ Aggregation failed for {}: {}", asset, e);
            std::process::exit(1);
        }
    }

    println!("✅ Aggregation complete");
}

fn aggregate_asset(store: &DataStore, asset: Asset) -> Result<()> {
    let year_files = store.list_year_files(asset, Timeframe::Minute1)?;
    if year_files.is_empty() {
        eprintln!("⚠️  No 1min data for {} - run pull first", asset);
        return Ok(());
    }

    println!("📊 Combining {} 1min year files for {}...", year_files.len(), asset);
    let mut all = Vec::new();
    for (_, path) in year_files {
        all.extend(store.read_candles(&path)?);
    }
    let (base, removed) = merge_candles(all, Vec::new());
    if removed > 0 {
        println!("🧹 Dropped {} duplicate timestamps", removed);
    }
    println!("📈 {} 1min candles", base.len());

    for timeframe in Timeframe::aggregated() {
        let aggregated = Aggregator::aggregate(base.clone(), timeframe);
        let path = store.full_file(asset, timeframe);
        store.write_candles(&path, &aggregated)?;
        println!(
            "💾 {} - {} candles -> {}",
            timeframe,
            aggregated.len(),
            path.display()
        );
    }

    Ok(())
}

//! Year pipeline: fetch → validate → repair
//!
//! Mirrors the dataset build flow: each year is fetched from Coinbase
//! (skipped when its file already validates), checked for cadence, and
//! holes are repaired from Binance.

use chrono::{Datelike, Utc};
use std::path::PathBuf;

use crate::error::Result;
use crate::models::{Asset, Timeframe};
use crate::services::{
    repair_file, validate_file, BinanceClient, CoinbaseClient, DataStore, YearFetcher,
};

pub fn run(asset: String, start_year: Option<i32>, end_year: Option<i32>, data_dir: PathBuf) {
    let assets = super::parse_assets(&asset);
    let store = DataStore::new(data_dir);
    let current_year = Utc::now().year();

    let runtime = super::build_runtime();

    let mut successful: Vec<(Asset, i32)> = Vec::new();
    let mut failed: Vec<(Asset, i32)> = Vec::new();

    for asset in assets {
        let first = start_year.unwrap_or_else(|| asset.first_year());
        let last = end_year.unwrap_or(current_year).min(current_year);

        println!("🚀 Pulling {} years {}..={}", asset, first, last);

        for year in first..=last {
            println!("{}", "=".repeat(60));
            println!("📅 {} {}", asset, year);

            let result = runtime.block_on(process_single_year(&store, asset, year));
            match result {
                Ok(true) => {
                    println!("🎉 {} {}: complete", asset, year);
                    successful.push((asset, year));
                }
                Ok(false) => {
                    println!("❌ {} {}: still has issues after repair", asset, year);
                    failed.push((asset, year));
                }
                Err(e) => {
                    eprintln!("❌ {} {}: {}", asset, year, e);
                    failed.push((asset, year));
                }
            }
        }
    }

    println!("{}", "=".repeat(60));
    println!("📊 Pull summary");
    println!("✅ Successful: {}", successful.len());
    if !failed.is_empty() {
        println!("❌ Failed: {}", failed.len());
        for (asset, year) in &failed {
            println!("   {} {}", asset, year);
        }
        println!("🔧 Re-run to retry failed years");
        std::process::exit(1);
    }
}

/// Fetch, validate and repair one asset-year. Returns whether the year
/// file ended up clean.
async fn process_single_year(store: &DataStore, asset: Asset, year: i32) -> Result<bool> {
    let path = store.year_file(asset, Timeframe::Minute1, year);

    if path.exists() {
        println!("📄 {} exists - validating...", path.display());
        let report = validate_file(&path, Timeframe::Minute1)?;
        if report.is_clean() {
            println!("✅ Already complete ({} rows)", report.rows);
            return Ok(true);
        }
        println!("⚠️  {} - repairing...", report.summary());
    } else {
        println!("📡 Fetching {} {} from Coinbase...", asset, year);
        let client = CoinbaseClient::new()?;
        let fetched = YearFetcher::new(client).fetch_year(asset, year).await?;
        println!(
            "💾 Writing {} candles ({} of {} windows failed)",
            fetched.candles.len(),
            fetched.failed_windows,
            fetched.windows
        );
        store.write_candles(&path, &fetched.candles)?;

        let report = validate_file(&path, Timeframe::Minute1)?;
        if report.is_clean() {
            return Ok(true);
        }
        println!("⚠️  {} - repairing...", report.summary());
    }

    let binance = BinanceClient::new()?;
    let outcome = repair_file(&binance, asset, &path).await?;
    println!(
        "🔧 Repaired {} ranges ({} candles fetched, {} rows total)",
        outcome.ranges, outcome.fetched, outcome.rows
    );

    Ok(outcome.report.is_clean())
}

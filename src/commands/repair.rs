//! Repair one year file's missing ranges from Binance.

use std::path::PathBuf;

use crate::models::Timeframe;
use crate::services::{repair_file, BinanceClient, DataStore};

pub fn run(asset: String, year: i32, data_dir: PathBuf) {
    let assets = super::parse_assets(&asset);
    let store = DataStore::new(data_dir);
    let runtime = super::build_runtime();

    for asset in assets {
        let path = store.year_file(asset, Timeframe::Minute1, year);
        if !path.exists() {
            eprintln!("❌ {} not found - run pull first", path.display());
            std::process::exit(1);
        }

        println!("🔧 Repairing {}...", path.display());

        let outcome = runtime.block_on(async {
            let client = BinanceClient::new()?;
            repair_file(&client, asset, &path).await
        });

        match outcome {
            Ok(outcome) if outcome.ranges == 0 => {
                println!("✅ {} was already complete ({} rows)", path.display(), outcome.rows);
            }
            Ok(outcome) => {
                println!(
                    "📈 Fetched {} candles for {} ranges ({} rows total)",
                    outcome.fetched, outcome.ranges, outcome.rows
                );
                if outcome.report.is_clean() {
                    println!("✅ {} is now complete", path.display());
                } else {
                    println!("⚠️  Still incomplete: {}", outcome.report.summary());
                    std::process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("❌ Repair failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}

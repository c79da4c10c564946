//! Split a timeframe's `full.csv` into per-year files.

use std::path::PathBuf;
use std::str::FromStr;

use crate::models::Timeframe;
use crate::services::{split_full_by_year, DataStore};

pub fn run(asset: String, timeframe: String, data_dir: PathBuf) {
    let assets = super::parse_assets(&asset);
    let timeframe = match Timeframe::from_str(&timeframe) {
        Ok(tf) => tf,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    let store = DataStore::new(data_dir);

    for asset in assets {
        match split_full_by_year(&store, asset, timeframe) {
            Ok(written) => {
                for (year, rows) in &written {
                    println!("💾 {} {} {} - {} rows", asset, timeframe, year, rows);
                }
                println!("✅ Yearly split complete for {} {}", asset, timeframe);
            }
            Err(e) => {
                eprintln!("❌ Split failed for {} {}: {}", asset, timeframe, e);
                std::process::exit(1);
            }
        }
    }
}

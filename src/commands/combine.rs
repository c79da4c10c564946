//! Concatenate 1-minute year files into `full.csv`.

use std::path::PathBuf;

use crate::models::Timeframe;
use crate::services::{combine_years, DataStore};

pub fn run(asset: String, data_dir: PathBuf) {
    let assets = super::parse_assets(&asset);
    let store = DataStore::new(data_dir);

    for asset in assets {
        match combine_years(&store, asset, Timeframe::Minute1) {
            Ok(rows) => {
                println!(
                    "✅ {} rows -> {}",
                    rows,
                    store.full_file(asset, Timeframe::Minute1).display()
                );
            }
            Err(e) => {
                eprintln!("❌ Combine failed for {}: {}", asset, e);
                std::process::exit(1);
            }
        }
    }
}

//! Insert missing first minutes at year boundaries.

use std::path::PathBuf;

use crate::services::{fill_year_boundaries, DataStore};

pub fn run(asset: String, data_dir: PathBuf) {
    let assets = super::parse_assets(&asset);
    let store = DataStore::new(data_dir);

    for asset in assets {
        println!("🔧 Checking {} year boundaries...", asset);

        match fill_year_boundaries(&store, asset) {
            Ok(fills) if fills.is_empty() => {
                println!("✅ No year-boundary gaps");
            }
            Ok(fills) => {
                for fill in &fills {
                    println!(
                        "✅ Inserted {}-01-01 00:00:00 (unix {})",
                        fill.year, fill.inserted_unix
                    );
                }
                println!("📊 Inserted {} rows", fills.len());
            }
            Err(e) => {
                eprintln!("❌ Gap fill failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}

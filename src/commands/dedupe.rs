//! Remove duplicate timestamps from 1-minute year files.

use std::path::PathBuf;

use crate::services::{dedupe_all_years, DataStore};

pub fn run(asset: String, data_dir: PathBuf) {
    let assets = super::parse_assets(&asset);
    let store = DataStore::new(data_dir);

    for asset in assets {
        println!("🔧 Deduplicating {} year files...", asset);

        match dedupe_all_years(&store, asset) {
            Ok(reports) => {
                let mut total_removed = 0;
                for report in &reports {
                    if report.removed > 0 {
                        println!(
                            "🗑️  {} - removed {} of {} rows (backup kept)",
                            report.path.display(),
                            report.removed,
                            report.total_rows
                        );
                        total_removed += report.removed;
                    }
                }
                if total_removed == 0 {
                    println!("✅ No duplicates in {} files", reports.len());
                } else {
                    println!(
                        "✅ Removed {} duplicates across {} files",
                        total_removed,
                        reports.len()
                    );
                }
            }
            Err(e) => {
                eprintln!("❌ Dedupe failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}

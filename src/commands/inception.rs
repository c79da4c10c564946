//! Probe the first date an asset traded on Coinbase.

use chrono::{NaiveDate, Utc};

use crate::services::{find_first_trading_date, CoinbaseClient};

pub fn run(asset: String, from: Option<String>) {
    let assets = super::parse_assets(&asset);
    let probe_from = match from {
        Some(date) => match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ Invalid --from date '{}': {}", date, e);
                std::process::exit(1);
            }
        },
        None => Utc::now().date_naive(),
    };

    let runtime = super::build_runtime();

    for asset in assets {
        println!(
            "🔍 Probing first {} trading date backwards from {}...",
            asset, probe_from
        );

        let result = runtime.block_on(async {
            let client = CoinbaseClient::new()?;
            find_first_trading_date(&client, asset, probe_from).await
        });

        match result {
            Ok(Some(date)) => {
                println!("🎯 First {} data date: {}", asset, date.format("%B %d, %Y"));
            }
            Ok(None) => {
                println!("❌ Could not determine first {} date", asset);
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("❌ Probe failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}

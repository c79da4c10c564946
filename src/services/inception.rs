//! First-trading-date probe
//!
//! Walks backwards one day at a time, asking Coinbase for a daily candle,
//! until it finds a day with no data. The day after that is the first
//! date the product traded.

use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::constants::INCEPTION_PROBE_LIMIT;
use crate::error::Result;
use crate::models::Asset;
use crate::services::coinbase::CoinbaseClient;

/// Find the first date `asset` has daily data, probing backwards from
/// `probe_from`. Returns `None` when `probe_from` itself has no data or
/// the safety cap is hit.
pub async fn find_first_trading_date(
    client: &CoinbaseClient,
    asset: Asset,
    probe_from: NaiveDate,
) -> Result<Option<NaiveDate>> {
    let product = asset.coinbase_product();
    let mut current = probe_from;

    if !client.day_has_data(product, current).await? {
        return Ok(None);
    }

    let mut days_checked: u32 = 0;
    loop {
        let previous = current - Duration::days(1);
        if !client.day_has_data(product, previous).await? {
            info!(%product, first_date = %current, days_checked, "Found first trading date");
            return Ok(Some(current));
        }

        current = previous;
        days_checked += 1;
        if days_checked > INCEPTION_PROBE_LIMIT {
            info!(%product, days_checked, "Inception probe hit safety limit");
            return Ok(None);
        }
    }
}

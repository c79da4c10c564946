//! Year fetch orchestration
//!
//! Splits a calendar year into 300-minute request windows and fetches
//! them from Coinbase with a bounded pool of staggered workers. Windows
//! are reassembled in order and the whole span is gap-filled so the
//! resulting file keeps exact 60-second cadence.

use chrono::{TimeZone, Utc};
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::constants::{COINBASE_MAX_CANDLES, COINBASE_STAGGER_MS, FETCH_WORKERS, MINUTE_SECS};
use crate::error::{Error, Result};
use crate::models::{Asset, Candle};
use crate::services::coinbase::CoinbaseClient;
use crate::services::gap_fill::fill_minute_gaps;

/// Result of fetching one year of 1-minute data.
#[derive(Debug)]
pub struct YearFetch {
    pub candles: Vec<Candle>,
    pub windows: usize,
    pub failed_windows: usize,
}

pub struct YearFetcher {
    client: CoinbaseClient,
    workers: usize,
}

impl YearFetcher {
    pub fn new(client: CoinbaseClient) -> Self {
        Self {
            client,
            workers: FETCH_WORKERS,
        }
    }

    /// Fetch one calendar year of 1-minute candles for `asset`.
    ///
    /// For the current year the span ends at the current minute. Windows
    /// that keep failing after retries are logged and left to the repair
    /// step; their minutes come out as carried-forward rows.
    pub async fn fetch_year(&self, asset: Asset, year: i32) -> Result<YearFetch> {
        let (start_unix, end_unix) = year_span(year)?;
        let product = asset.coinbase_product();

        let window_secs = COINBASE_MAX_CANDLES * MINUTE_SECS;
        let mut windows = Vec::new();
        let mut current = start_unix;
        while current < end_unix {
            let window_end = (current + window_secs).min(end_unix);
            windows.push((current, window_end));
            current = window_end;
        }

        info!(
            %product,
            year,
            windows = windows.len(),
            workers = self.workers,
            "Fetching year from Coinbase"
        );

        let progress = ProgressBar::new(windows.len() as u64);
        let mut results: BTreeMap<i64, Vec<Candle>> = BTreeMap::new();
        let mut failed_windows = 0;

        // Bounded concurrency: one batch of workers at a time
        for batch in windows.chunks(self.workers) {
            let mut set: JoinSet<(i64, Result<Vec<Candle>>)> = JoinSet::new();

            for (slot, &(win_start, win_end)) in batch.iter().enumerate() {
                let client = self.client.clone();
                let product = product.to_string();
                let stagger = COINBASE_STAGGER_MS * slot as u64;

                set.spawn(async move {
                    // Stagger startup so a batch does not hit the API at once
                    tokio::time::sleep(Duration::from_millis(stagger)).await;
                    let fetched = client.get_minute_candles(&product, win_start, win_end).await;
                    (win_start, fetched)
                });
            }

            while let Some(joined) = set.join_next().await {
                progress.inc(1);
                let (win_start, fetched) = match joined {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(error = %e, "Fetch task panicked");
                        failed_windows += 1;
                        continue;
                    }
                };
                match fetched {
                    Ok(candles) => {
                        results.insert(win_start, candles);
                    }
                    Err(e) => {
                        warn!(win_start, error = %e, "Window failed after retries");
                        failed_windows += 1;
                    }
                }
            }
        }
        progress.finish_and_clear();

        // Assemble in window order, then plug gaps across the whole span
        let raw: Vec<Candle> = results.into_values().flatten().collect();
        let fetched_count = raw.len();
        let candles = fill_minute_gaps(raw, start_unix, end_unix, None);

        info!(
            year,
            fetched = fetched_count,
            total = candles.len(),
            failed_windows,
            "Year assembled"
        );

        Ok(YearFetch {
            candles,
            windows: windows.len(),
            failed_windows,
        })
    }
}

/// `[start, end)` unix span of a calendar year, capped at the current
/// minute for the current year.
fn year_span(year: i32) -> Result<(i64, i64)> {
    let start = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::InvalidInput(format!("Bad year: {}", year)))?
        .timestamp();
    let next_year = Utc
        .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::InvalidInput(format!("Bad year: {}", year)))?
        .timestamp();

    let now_minute = (Utc::now().timestamp() / MINUTE_SECS) * MINUTE_SECS;
    if start >= now_minute {
        return Err(Error::InvalidInput(format!(
            "Year {} has no data yet",
            year
        )));
    }

    Ok((start, next_year.min(now_minute)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_year_span_past_year() {
        let (start, end) = year_span(2020).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().timestamp());
        assert_eq!(end, Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap().timestamp());
        // leap year: 366 days of minutes
        assert_eq!((end - start) / MINUTE_SECS, 366 * 24 * 60);
    }

    #[test]
    fn test_year_span_rejects_future_year() {
        let future = Utc::now().date_naive().year() + 1;
        assert!(year_span(future).is_err());
    }
}

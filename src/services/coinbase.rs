//! Coinbase Exchange candles client
//!
//! Primary source for 1-minute history. The candles endpoint returns at
//! most 300 rows per request as `[time, low, high, open, close, volume]`
//! arrays, newest first.

use chrono::{NaiveDate, TimeZone, Utc};
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{COINBASE_BASE_URL, DAY_SECS, MAX_RETRIES, MINUTE_SECS, RETRY_BASE_DELAY_SECS};
use crate::error::{Error, Result};
use crate::models::Candle;

/// Raw candle array as returned by the API.
type RawCandle = (i64, f64, f64, f64, f64, f64);

#[derive(Debug, Clone)]
pub struct CoinbaseClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinbaseClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(COINBASE_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Invalid base_url: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Fetch candles for `[start_unix, end_unix)` at the given granularity.
    ///
    /// Retries with exponential backoff on rate limiting, server errors
    /// and transport failures. Returns candles sorted oldest first.
    pub async fn get_candles(
        &self,
        product: &str,
        start_unix: i64,
        end_unix: i64,
        granularity: i64,
    ) -> Result<Vec<Candle>> {
        let url = format!("{}/products/{}/candles", self.base_url, product);
        let start = format_iso(start_unix)?;
        let end = format_iso(end_unix)?;
        let granularity = granularity.to_string();

        let mut attempt: u32 = 0;
        loop {
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("start", start.as_str()),
                    ("end", end.as_str()),
                    ("granularity", granularity.as_str()),
                ])
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let raw: Vec<RawCandle> = resp
                        .json()
                        .await
                        .map_err(|e| Error::Parse(format!("Bad candles payload: {}", e)))?;
                    return candles_from_raw(raw);
                }
                Ok(resp) => {
                    let status = resp.status();
                    if attempt >= MAX_RETRIES {
                        if status.as_u16() == 429 {
                            return Err(Error::RateLimit);
                        }
                        let body = resp.text().await.unwrap_or_default();
                        return Err(Error::Network(format!(
                            "Coinbase request failed: {} {}",
                            status, body
                        )));
                    }
                    warn!(
                        %status,
                        attempt = attempt + 1,
                        max = MAX_RETRIES,
                        "Coinbase request failed, retrying"
                    );
                }
                Err(e) => {
                    if attempt >= MAX_RETRIES {
                        return Err(Error::Network(format!("Coinbase request error: {}", e)));
                    }
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max = MAX_RETRIES,
                        "Coinbase request error, retrying"
                    );
                }
            }

            let delay = RETRY_BASE_DELAY_SECS * 2u64.pow(attempt);
            tokio::time::sleep(Duration::from_secs(delay)).await;
            attempt += 1;
        }
    }

    /// Fetch one window of 1-minute candles.
    pub async fn get_minute_candles(
        &self,
        product: &str,
        start_unix: i64,
        end_unix: i64,
    ) -> Result<Vec<Candle>> {
        self.get_candles(product, start_unix, end_unix, MINUTE_SECS).await
    }

    /// Whether the product has any trade data on the given UTC date.
    ///
    /// Requests a single daily candle spanning the date.
    pub async fn day_has_data(&self, product: &str, date: NaiveDate) -> Result<bool> {
        let start = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::InvalidInput(format!("Bad date: {}", date)))?;
        let start_unix = Utc.from_utc_datetime(&start).timestamp();
        let candles = self
            .get_candles(product, start_unix, start_unix + DAY_SECS, DAY_SECS)
            .await?;
        debug!(%product, %date, candles = candles.len(), "Inception probe");
        Ok(!candles.is_empty())
    }
}

fn format_iso(unix: i64) -> Result<String> {
    let time = Utc
        .timestamp_opt(unix, 0)
        .single()
        .ok_or_else(|| Error::InvalidInput(format!("Invalid unix timestamp: {}", unix)))?;
    Ok(time.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

/// Convert the API's `[time, low, high, open, close, volume]` arrays,
/// reordering oldest first.
fn candles_from_raw(mut raw: Vec<RawCandle>) -> Result<Vec<Candle>> {
    raw.sort_by_key(|c| c.0);

    let mut candles = Vec::with_capacity(raw.len());
    for (unix, low, high, open, close, volume) in raw {
        let time = Utc
            .timestamp_opt(unix, 0)
            .single()
            .ok_or_else(|| Error::Parse(format!("Invalid candle timestamp: {}", unix)))?;
        candles.push(Candle::new(time, open, high, low, close, volume));
    }
    Ok(candles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candles_from_raw_sorts_and_maps_fields() {
        // newest first, as the API returns them
        let raw = vec![
            (1609459260, 28990.0, 29120.0, 29050.0, 29100.0, 2.5),
            (1609459200, 28950.0, 29100.0, 29000.0, 29050.0, 12.5),
        ];

        let candles = candles_from_raw(raw).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].unix(), 1609459200);
        assert_eq!(candles[0].open, 29000.0);
        assert_eq!(candles[0].high, 29100.0);
        assert_eq!(candles[0].low, 28950.0);
        assert_eq!(candles[0].close, 29050.0);
        assert_eq!(candles[0].volume, 12.5);
        assert_eq!(candles[1].unix(), 1609459260);
    }

    #[test]
    fn test_format_iso() {
        assert_eq!(format_iso(1609459200).unwrap(), "2021-01-01T00:00:00Z");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(CoinbaseClient::with_base_url("ftp://example.com".to_string()).is_err());
    }
}

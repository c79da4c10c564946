//! Binance klines client
//!
//! Used to repair ranges the Coinbase history is missing. The klines
//! endpoint takes millisecond timestamps and returns up to 1000 rows of
//! `[open_time_ms, "open", "high", "low", "close", "volume", ...]`.

use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{
    BINANCE_BASE_URL, BINANCE_DELAY_MS, BINANCE_MAX_CANDLES, MAX_RETRIES, MINUTE_SECS,
    RETRY_BASE_DELAY_SECS,
};
use crate::error::{Error, Result};
use crate::models::Candle;

#[derive(Debug, Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BINANCE_BASE_URL.to_string())
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

    /// Fetch 1-minute klines for the inclusive range `[start_unix, end_unix]`.
    async fn get_klines(&self, symbol: &str, start_unix: i64, end_unix: i64) -> Result<Vec<Candle>> {
        let url = format!("{}/api/v3/klines", self.base_url);

        let mut attempt: u32 = 0;
        loop {
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("symbol", symbol.to_string()),
                    ("interval", "1m".to_string()),
                    ("startTime", (start_unix * 1000).to_string()),
                    ("endTime", (end_unix * 1000).to_string()),
                    ("limit", BINANCE_MAX_CANDLES.to_string()),
                ])
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let rows: Vec<Vec<Value>> = resp
                        .json()
                        .await
                        .map_err(|e| Error::Parse(format!("Bad klines payload: {}", e)))?;
                    return candles_from_klines(&rows);
                }
                Ok(resp) => {
                    let status = resp.status();
                    if attempt >= MAX_RETRIES {
                        if status.as_u16() == 429 {
                            return Err(Error::RateLimit);
                        }
                        let body = resp.text().await.unwrap_or_default();
                        return Err(Error::Network(format!(
                            "Binance request failed: {} {}",
                            status, body
                        )));
                    }
                    warn!(
                        %status,
                        attempt = attempt + 1,
                        max = MAX_RETRIES,
                        "Binance request failed, retrying"
                    );
                }
                Err(e) => {
                    if attempt >= MAX_RETRIES {
                        return Err(Error::Network(format!("Binance request error: {}", e)));
                    }
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max = MAX_RETRIES,
                        "Binance request error, retrying"
                    );
                }
            }

            let delay = RETRY_BASE_DELAY_SECS * 2u64.pow(attempt);
            tokio::time::sleep(Duration::from_secs(delay)).await;
            attempt += 1;
        }
    }

    /// Fetch an inclusive minute range, chunked to the 1000-kline limit.
    pub async fn fetch_range(
        &self,
        symbol: &str,
        start_unix: i64,
        end_unix: i64,
    ) -> Result<Vec<Candle>> {
        let chunk_span = BINANCE_MAX_CANDLES * MINUTE_SECS;
        let mut all = Vec::new();

        let mut current = start_unix;
        while current <= end_unix {
            let chunk_end = (current + chunk_span - MINUTE_SECS).min(end_unix);
            debug!(symbol, start = current, end = chunk_end, "Fetching klines chunk");

            let batch = self.get_klines(symbol, current, chunk_end).await?;
            all.extend(batch);

            current = chunk_end + MINUTE_SECS;
            if current <= end_unix {
                tokio::time::sleep(Duration::from_millis(BINANCE_DELAY_MS)).await;
            }
        }

        all.sort_by_key(|c| c.time);
        Ok(all)
    }
}

/// Convert kline arrays into candles. Prices arrive as decimal strings.
fn candles_from_klines(rows: &[Vec<Value>]) -> Result<Vec<Candle>> {
    let mut candles = Vec::with_capacity(rows.len());

    for row in rows {
        if row.len() < 6 {
            return Err(Error::Parse(format!(
                "Kline row has {} fields, expected at least 6",
                row.len()
            )));
        }

        let open_time_ms = row[0]
            .as_i64()
            .ok_or_else(|| Error::Parse("Kline open time is not an integer".to_string()))?;
        let unix = open_time_ms / 1000;
        let time = Utc
            .timestamp_opt(unix, 0)
            .single()
            .ok_or_else(|| Error::Parse(format!("Invalid kline timestamp: {}", unix)))?;

        let open = parse_price(&row[1], "open")?;
        let high = parse_price(&row[2], "high")?;
        let low = parse_price(&row[3], "low")?;
        let close = parse_price(&row[4], "close")?;
        let volume = parse_price(&row[5], "volume")?;

        candles.push(Candle::new(time, open, high, low, close, volume));
    }

    Ok(candles)
}

fn parse_price(value: &Value, field: &str) -> Result<f64> {
    match value {
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|e| Error::Parse(format!("Bad kline {}: {}", field, e))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::Parse(format!("Bad kline {}", field))),
        _ => Err(Error::Parse(format!("Kline {} is not a number", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candles_from_klines() {
        let rows = vec![vec![
            json!(1609459200000i64),
            json!("29000.10"),
            json!("29100.00"),
            json!("28950.50"),
            json!("29050.00"),
            json!("12.345"),
            json!(1609459259999i64),
            json!("358000.0"),
            json!(100),
            json!("6.0"),
            json!("174000.0"),
            json!("0"),
        ]];

        let candles = candles_from_klines(&rows).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].unix(), 1609459200);
        assert_eq!(candles[0].open, 29000.10);
        assert_eq!(candles[0].high, 29100.00);
        assert_eq!(candles[0].low, 28950.50);
        assert_eq!(candles[0].close, 29050.00);
        assert_eq!(candles[0].volume, 12.345);
    }

    #[test]
    fn test_short_kline_row_is_rejected() {
        let rows = vec![vec![json!(1609459200000i64), json!("1.0")]];
        assert!(candles_from_klines(&rows).is_err());
    }
}

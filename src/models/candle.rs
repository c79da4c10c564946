use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV candlestick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start time
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price
    pub close: f64,

    /// Traded quantity (base units, fractional)
    pub volume: f64,
}

impl Candle {
    pub fn new(time: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Unix timestamp of the bucket start, in seconds.
    pub fn unix(&self) -> i64 {
        self.time.timestamp()
    }

    /// Synthetic continuation candle for a minute the exchange had no
    /// trade for: same prices, zero volume.
    pub fn carry_forward(&self, time: DateTime<Utc>) -> Self {
        Self {
            time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: 0.0,
        }
    }

    /// All-zero placeholder used when a gap precedes any real candle.
    pub fn zero(time: DateTime<Utc>) -> Self {
        Self::new(time, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// `low <= min(open, close)` and `high >= max(open, close)`.
    pub fn prices_consistent(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_carry_forward_zeroes_volume() {
        let t0 = Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2021, 3, 1, 12, 1, 0).unwrap();
        let candle = Candle::new(t0, 100.0, 110.0, 90.0, 105.0, 3.5);

        let filled = candle.carry_forward(t1);
        assert_eq!(filled.time, t1);
        assert_eq!(filled.open, 100.0);
        assert_eq!(filled.high, 110.0);
        assert_eq!(filled.low, 90.0);
        assert_eq!(filled.close, 105.0);
        assert_eq!(filled.volume, 0.0);
    }

    #[test]
    fn test_prices_consistent() {
        let t = Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap();
        assert!(Candle::new(t, 100.0, 110.0, 90.0, 105.0, 1.0).prices_consistent());
        // high below close
        assert!(!Candle::new(t, 100.0, 101.0, 90.0, 105.0, 1.0).prices_consistent());
        // low above open
        assert!(!Candle::new(t, 100.0, 110.0, 100.5, 105.0, 1.0).prices_consistent());
        // zero placeholder is consistent
        assert!(Candle::zero(t).prices_consistent());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Aggregation timeframe for candle data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1-minute candles (base data)
    Minute1,
    /// 5-minute candles
    Minute5,
    /// 30-minute candles
    Minute30,
    /// Hourly candles
    Hour1,
    /// Daily candles
    Day1,
    /// Weekly candles (weeks start Monday 00:00 UTC)
    Week1,
}

impl Timeframe {
    /// Get all timeframes, base first
    pub fn all() -> Vec<Timeframe> {
        vec![
            Timeframe::Minute1,
            Timeframe::Minute5,
            Timeframe::Minute30,
            Timeframe::Hour1,
            Timeframe::Day1,
            Timeframe::Week1,
        ]
    }

    /// Timeframes derived from 1-minute data by aggregation
    pub fn aggregated() -> Vec<Timeframe> {
        vec![
            Timeframe::Minute5,
            Timeframe::Minute30,
            Timeframe::Hour1,
            Timeframe::Day1,
            Timeframe::Week1,
        ]
    }

    /// Directory name under `data/<asset>/`
    pub fn dir_name(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1min",
            Timeframe::Minute5 => "5min",
            Timeframe::Minute30 => "30min",
            Timeframe::Hour1 => "hourly",
            Timeframe::Day1 => "daily",
            Timeframe::Week1 => "weekly",
        }
    }

    /// Short interval label
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Day1 => "1d",
            Timeframe::Week1 => "1w",
        }
    }

    /// Sub-hour bucket width in minutes, where that is how buckets are cut
    pub fn bucket_minutes(&self) -> Option<i64> {
        match self {
            Timeframe::Minute5 => Some(5),
            Timeframe::Minute30 => Some(30),
            _ => None,
        }
    }

    /// Exact cadence in seconds the file must keep, if any.
    ///
    /// Only the base 1-minute data is contiguous by construction;
    /// aggregated files only hold buckets that had source rows.
    pub fn fixed_step_secs(&self) -> Option<i64> {
        match self {
            Timeframe::Minute1 => Some(crate::constants::MINUTE_SECS),
            _ => None,
        }
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1min" | "1m" | "minute" => Ok(Timeframe::Minute1),
            "5min" | "5m" => Ok(Timeframe::Minute5),
            "30min" | "30m" => Ok(Timeframe::Minute30),
            "hourly" | "1h" => Ok(Timeframe::Hour1),
            "daily" | "1d" => Ok(Timeframe::Day1),
            "weekly" | "1w" => Ok(Timeframe::Week1),
            other => Err(Error::InvalidInput(format!(
                "Unknown timeframe: {} (expected 1min, 5min, 30min, hourly, daily or weekly)",
                other
            ))),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Minute1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeframe() {
        assert_eq!("1min".parse::<Timeframe>().unwrap(), Timeframe::Minute1);
        assert_eq!("5m".parse::<Timeframe>().unwrap(), Timeframe::Minute5);
        assert_eq!("HOURLY".parse::<Timeframe>().unwrap(), Timeframe::Hour1);
        assert_eq!("1w".parse::<Timeframe>().unwrap(), Timeframe::Week1);
        assert!("2h".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_cadence() {
        assert_eq!(Timeframe::Minute1.fixed_step_secs(), Some(60));
        assert_eq!(Timeframe::Hour1.fixed_step_secs(), None);
        assert_eq!(Timeframe::Minute30.bucket_minutes(), Some(30));
    }
}

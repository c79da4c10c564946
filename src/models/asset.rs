use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Asset tracked by the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Btc,
    Eth,
}

impl Asset {
    pub fn all() -> Vec<Asset> {
        vec![Asset::Btc, Asset::Eth]
    }

    /// Coinbase Exchange product id
    pub fn coinbase_product(&self) -> &'static str {
        match self {
            Asset::Btc => "BTC-USD",
            Asset::Eth => "ETH-USD",
        }
    }

    /// Binance spot symbol used for gap repair
    pub fn binance_symbol(&self) -> &'static str {
        match self {
            Asset::Btc => "BTCUSDT",
            Asset::Eth => "ETHUSDT",
        }
    }

    /// Directory name under the dataset root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Asset::Btc => "btc",
            Asset::Eth => "eth",
        }
    }

    /// First calendar year with data in the dataset
    pub fn first_year(&self) -> i32 {
        match self {
            Asset::Btc => 2011,
            Asset::Eth => 2016,
        }
    }
}

impl FromStr for Asset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "btc" | "btcusd" | "btc-usd" => Ok(Asset::Btc),
            "eth" | "ethusd" | "eth-usd" => Ok(Asset::Eth),
            other => Err(Error::InvalidInput(format!(
                "Unknown asset: {} (expected btc or eth)",
                other
            ))),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_asset() {
        assert_eq!("btc".parse::<Asset>().unwrap(), Asset::Btc);
        assert_eq!("ETH".parse::<Asset>().unwrap(), Asset::Eth);
        assert_eq!("BTC-USD".parse::<Asset>().unwrap(), Asset::Btc);
        assert!("doge".parse::<Asset>().is_err());
    }

    #[test]
    fn test_asset_symbols() {
        assert_eq!(Asset::Btc.coinbase_product(), "BTC-USD");
        assert_eq!(Asset::Eth.binance_symbol(), "ETHUSDT");
        assert_eq!(Asset::Btc.to_string(), "btc");
    }
}

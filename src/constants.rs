//! Dataset and API constants
//!
//! Defines the CSV schema shared by every file in the dataset and the
//! request limits of the two exchange APIs the pipeline talks to.

/// Coinbase Exchange REST API base URL (primary candle source)
pub const COINBASE_BASE_URL: &str = "https://api.exchange.coinbase.com";

/// Binance REST API base URL (gap repair source)
pub const BINANCE_BASE_URL: &str = "https://api.binance.com";

/// Seconds per 1-minute candle
pub const MINUTE_SECS: i64 = 60;

/// Seconds per daily candle (inception probing)
pub const DAY_SECS: i64 = 86_400;

/// Coinbase returns at most 300 candles per request at 1m granularity
pub const COINBASE_MAX_CANDLES: i64 = 300;

/// Binance returns at most 1000 klines per request
pub const BINANCE_MAX_CANDLES: i64 = 1000;

/// Maximum retries for a failed API request
pub const MAX_RETRIES: u32 = 5;

/// Initial delay between retries, doubled on each attempt
pub const RETRY_BASE_DELAY_SECS: u64 = 2;

/// Concurrent fetch workers for the Coinbase year fetch
pub const FETCH_WORKERS: usize = 30;

/// Stagger between Coinbase requests to stay under the rate limit
pub const COINBASE_STAGGER_MS: u64 = 50;

/// Delay between Binance requests during repair
pub const BINANCE_DELAY_MS: u64 = 100;

/// Number of columns in every dataset CSV
pub const CSV_COLUMNS: usize = 7;

/// Header row, in the documented column order
pub const CSV_HEADER: [&str; CSV_COLUMNS] = [
    "timestamp",
    "open",
    "close",
    "volume",
    "unix_timestamp",
    "high",
    "low",
];

/// Column indices for the dataset CSV format (0-indexed)
pub mod csv_column {
    pub const TIMESTAMP: usize = 0;
    pub const OPEN: usize = 1;
    pub const CLOSE: usize = 2;
    pub const VOLUME: usize = 3;
    pub const UNIX_TIMESTAMP: usize = 4;
    pub const HIGH: usize = 5;
    pub const LOW: usize = 6;
}

/// Human-readable timestamp format used in the `timestamp` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default dataset root directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default port for the price lookup server
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Safety cap for the backwards inception probe (10 years of days)
pub const INCEPTION_PROBE_LIMIT: u32 = 3650;

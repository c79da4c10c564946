pub mod aggregator;
pub mod binance;
pub mod coinbase;
pub mod dedupe;
pub mod fetcher;
pub mod gap_fill;
pub mod inception;
pub mod repair;
pub mod splitter;
pub mod store;
pub mod validator;

pub use aggregator::Aggregator;
pub use binance::BinanceClient;
pub use coinbase::CoinbaseClient;
pub use dedupe::{dedupe_all_years, dedupe_file, DedupeReport};
pub use fetcher::{YearFetch, YearFetcher};
pub use gap_fill::{fill_minute_gaps, fill_year_boundaries, BoundaryFill};
pub use inception::find_first_trading_date;
pub use repair::{merge_candles, repair_file, RepairOutcome};
pub use splitter::{combine_years, split_full_by_year};
pub use store::DataStore;
pub use validator::{
    missing_ranges, validate_file, verify_aggregation, ConsistencyReport, ValidationReport,
};

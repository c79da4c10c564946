use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_SERVER_PORT};

#[derive(Parser)]
#[command(name = "candlevault")]
#[command(about = "Builds and maintains the BTC/ETH candlestick CSV dataset", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, validate and repair 1-minute data year by year
    Pull {
        /// Asset to pull: btc, eth or all
        #[arg(short, long, default_value = "btc")]
        asset: String,

        /// First year to process (defaults to the asset's first year)
        #[arg(long)]
        start_year: Option<i32>,

        /// Last year to process (defaults to the current year)
        #[arg(long)]
        end_year: Option<i32>,

        /// Dataset root directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Run integrity checks over the dataset
    Validate {
        /// Asset to validate: btc, eth or all
        #[arg(short, long, default_value = "all")]
        asset: String,

        /// Timeframe to validate: 1min, 5min, 30min, hourly, daily, weekly or all
        #[arg(short, long, default_value = "all")]
        timeframe: String,

        /// Dataset root directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Fetch missing ranges of a year file from Binance
    Repair {
        /// Asset to repair: btc, eth or all
        #[arg(short, long, default_value = "btc")]
        asset: String,

        /// Year file to repair
        #[arg(short, long)]
        year: i32,

        /// Dataset root directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Remove duplicate timestamps from 1-minute year files
    Dedupe {
        /// Asset to dedupe: btc, eth or all
        #[arg(short, long, default_value = "all")]
        asset: String,

        /// Dataset root directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Insert missing first minutes at year boundaries
    FillGaps {
        /// Asset to fill: btc, eth or all
        #[arg(short, long, default_value = "all")]
        asset: String,

        /// Dataset root directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Aggregate 1-minute data into 5min/30min/hourly/daily/weekly
    Aggregate {
        /// Asset to aggregate: btc, eth or all
        #[arg(short, long, default_value = "all")]
        asset: String,

        /// Dataset root directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Split a timeframe's full.csv into per-year files
    SplitYearly {
        /// Asset to split: btc, eth or all
        #[arg(short, long, default_value = "all")]
        asset: String,

        /// Timeframe whose full.csv to split
        #[arg(short, long)]
        timeframe: String,

        /// Dataset root directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Concatenate 1-minute year files into full.csv
    Combine {
        /// Asset to combine: btc, eth or all
        #[arg(short, long, default_value = "all")]
        asset: String,

        /// Dataset root directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Show a summary of the dataset
    Status {
        /// Dataset root directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// Probe the first date an asset traded on Coinbase
    Inception {
        /// Asset to probe: btc, eth or all
        #[arg(short, long, default_value = "eth")]
        asset: String,

        /// Date to probe backwards from (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        from: Option<String>,
    },
    /// Serve the price lookup API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT)]
        port: u16,

        /// Dataset root directory
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pull {
            asset,
            start_year,
            end_year,
            data_dir,
        } => {
            commands::pull::run(asset, start_year, end_year, data_dir);
        }
        Commands::Validate {
            asset,
            timeframe,
            data_dir,
        } => {
            commands::validate::run(asset, timeframe, data_dir);
        }
        Commands::Repair {
            asset,
            year,
            data_dir,
        } => {
            commands::repair::run(asset, year, data_dir);
        }
        Commands::Dedupe { asset, data_dir } => {
            commands::dedupe::run(asset, data_dir);
        }
        Commands::FillGaps { asset, data_dir } => {
            commands::fill_gaps::run(asset, data_dir);
        }
        Commands::Aggregate { asset, data_dir } => {
            commands::aggregate::run(asset, data_dir);
        }
        Commands::SplitYearly {
            asset,
            timeframe,
            data_dir,
        } => {
            commands::split_yearly::run(asset, timeframe, data_dir);
        }
        Commands::Combine { asset, data_dir } => {
            commands::combine::run(asset, data_dir);
        }
        Commands::Status { data_dir } => {
            commands::status::run(data_dir);
        }
        Commands::Inception { asset, from } => {
            commands::inception::run(asset, from);
        }
        Commands::Serve { port, data_dir } => {
            commands::serve::run(port, data_dir);
        }
    }
}

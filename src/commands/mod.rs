pub mod aggregate;
pub mod combine;
pub mod dedupe;
pub mod fill_gaps;
pub mod inception;
pub mod pull;
pub mod repair;
pub mod serve;
pub mod split_yearly;
pub mod status;
pub mod validate;

use crate::models::Asset;

/// Parse an `--asset` argument: a single asset or `all`.
pub(crate) fn parse_assets(arg: &str) -> Vec<Asset> {
    if arg.to_lowercase() == "all" {
        return Asset::all();
    }
    match arg.parse::<Asset>() {
        Ok(asset) => vec![asset],
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

/// Build the Tokio runtime commands run their async work on.
pub(crate) fn build_runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to create async runtime: {}", e);
            std::process::exit(1);
        }
    }
}

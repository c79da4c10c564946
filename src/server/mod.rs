//! Price lookup API
//!
//! `GET /price?timestamp=<unix>&asset=<btc|eth>` returns the 1-minute
//! candle covering that timestamp. Year files are loaded from the CSV
//! store on first use and cached in memory per (asset, year).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::constants::{MINUTE_SECS, TIMESTAMP_FORMAT};
use crate::error::{Error, Result};
use crate::models::{Asset, Candle, Timeframe};
use crate::services::DataStore;

type YearCache = HashMap<(Asset, i32), Arc<Vec<Candle>>>;

#[derive(Clone)]
pub struct AppState {
    store: Arc<DataStore>,
    cache: Arc<RwLock<YearCache>>,
}

impl AppState {
    pub fn new(store: DataStore) -> Self {
        Self {
            store: Arc::new(store),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 1-minute candles for the asset/year, cached after first load.
    async fn year_candles(&self, asset: Asset, year: i32) -> Result<Arc<Vec<Candle>>> {
        if let Some(candles) = self.cache.read().await.get(&(asset, year)) {
            return Ok(candles.clone());
        }

        let path = self.store.year_file(asset, Timeframe::Minute1, year);
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "No data file for {} {}",
                asset, year
            )));
        }

        let candles = Arc::new(self.store.read_candles(&path)?);
        debug!(%asset, year, rows = candles.len(), "Loaded year file into cache");
        self.cache
            .write()
            .await
            .insert((asset, year), candles.clone());
        Ok(candles)
    }
}

#[derive(Debug, Deserialize)]
struct PriceQuery {
    timestamp: Option<String>,
    asset: Option<String>,
}

#[derive(Debug, Serialize)]
struct PriceResponse {
    asset: String,
    timestamp: String,
    unix_timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// GET /price - Look up the 1-minute candle at a unix timestamp
async fn get_price_handler(
    State(state): State<AppState>,
    Query(params): Query<PriceQuery>,
) -> Response {
    let raw_ts = match params.timestamp {
        Some(ts) => ts,
        None => return error_response(StatusCode::BAD_REQUEST, "Missing timestamp parameter"),
    };
    let unix: i64 = match raw_ts.parse() {
        Ok(v) => v,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid timestamp"),
    };

    let asset: Asset = match params.asset.as_deref().unwrap_or("btc").parse() {
        Ok(a) => a,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid asset"),
    };

    // Candles are keyed by their minute start
    let minute = (unix.div_euclid(MINUTE_SECS)) * MINUTE_SECS;
    let time = match Utc.timestamp_opt(minute, 0).single() {
        Some(t) => t,
        None => return error_response(StatusCode::BAD_REQUEST, "Invalid timestamp"),
    };

    let candles = match state.year_candles(asset, time.year()).await {
        Ok(c) => c,
        Err(Error::NotFound(_)) => {
            return error_response(StatusCode::NOT_FOUND, "No data found for this timestamp")
        }
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };

    match candles.binary_search_by_key(&minute, |c| c.unix()) {
        Ok(idx) => {
            let candle = &candles[idx];
            Json(PriceResponse {
                asset: asset.to_string(),
                timestamp: candle.time.format(TIMESTAMP_FORMAT).to_string(),
                unix_timestamp: candle.unix(),
                open: candle.open,
                high: candle.high,
                low: candle.low,
                close: candle.close,
                volume: candle.volume,
            })
            .into_response()
        }
        Err(_) => error_response(StatusCode::NOT_FOUND, "No data found for this timestamp"),
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    cached_years: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cached_years = state.cache.read().await.len();
    Json(HealthResponse {
        status: "ok",
        cached_years,
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/price", get(get_price_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the price API until the process is stopped.
pub async fn serve(store: DataStore, port: u16) -> Result<()> {
    let state = AppState::new(store);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Io(format!("Failed to bind {}: {}", addr, e)))?;

    info!(%addr, "Price API listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Io(format!("Server error: {}", e)))?;

    Ok(())
}

mod asset;
mod candle;
mod timeframe;

pub use asset::Asset;
pub use candle::Candle;
pub use timeframe::Timeframe;

/// Time series of candles for one asset and timeframe
pub type CandleSeries = Vec<Candle>;

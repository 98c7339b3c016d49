//! External market-data collaborators
//!
//! Thin HTTP wrappers: Kraken's public API for candles and last prices,
//! CoinGecko's markets listing for the scan universe. Failures surface as
//! errors and the call site skips the affected pair for this cycle - the next
//! scheduled run is the retry.

pub mod coingecko;
pub mod kraken;

pub use coingecko::CoinGeckoClient;
pub use kraken::KrakenClient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Close series for indicator and pivot work
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

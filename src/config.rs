//! Scanner configuration
//!
//! Every strategy tunable lives here. The config is built once in main,
//! validated, and passed by reference into detection and position code -
//! nothing reads ambient globals.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Configuration for one scan cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Candle timeframe in minutes
    pub timeframe_minutes: u32,

    /// Number of candles requested per pair
    pub candle_limit: usize,

    /// RSI lookback window
    pub rsi_period: usize,

    /// Pivot neighborhood half-width (bars on each side)
    pub pivot_order: usize,

    /// Number of consecutive pivots the divergence pattern spans
    pub pivot_count: usize,

    /// Minimum aligned samples before the classifier will run
    pub min_samples: usize,

    /// Require strictly falling/rising price pivots (false allows equal closes)
    pub strict_price_pivots: bool,

    /// Stop-loss distance as a fraction of entry
    pub sl_pct: f64,

    /// Take-profit tiers as fractions of entry, ascending
    pub tp1_pct: f64,
    pub tp2_pct: f64,
    pub tp3_pct: f64,

    /// Dollar risk carried by each trade
    pub risk_per_trade: f64,

    /// Balance used when no persisted state exists
    pub starting_balance: f64,

    /// Max number of pairs scanned per cycle
    pub universe_size: usize,

    /// Page size requested from the markets endpoint (filtered down afterwards)
    pub markets_per_page: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            timeframe_minutes: 15,
            candle_limit: 200,
            rsi_period: 14,
            pivot_order: 4,
            pivot_count: 3,
            min_samples: 100,
            strict_price_pivots: true,
            sl_pct: 0.02,
            tp1_pct: 0.015,
            tp2_pct: 0.03,
            tp3_pct: 0.045,
            risk_per_trade: 100.0,
            starting_balance: 10_000.0,
            universe_size: 120,
            markets_per_page: 200,
        }
    }
}

impl ScannerConfig {
    /// Reject configs that would make the exit ladder or detector nonsensical.
    /// A bad config aborts the run before any work is done.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.sl_pct > 0.0, "sl_pct must be positive");
        ensure!(self.tp1_pct > 0.0, "tp1_pct must be positive");
        ensure!(
            self.tp1_pct < self.tp2_pct && self.tp2_pct < self.tp3_pct,
            "take-profit tiers must be strictly ascending"
        );
        ensure!(self.risk_per_trade > 0.0, "risk_per_trade must be positive");
        ensure!(self.pivot_order >= 1, "pivot_order must be at least 1");
        ensure!(self.pivot_count >= 2, "pivot_count must be at least 2");
        ensure!(self.rsi_period >= 2, "rsi_period must be at least 2");
        ensure!(
            self.min_samples >= 2 * self.pivot_order + 1,
            "min_samples too small for the pivot window"
        );
        Ok(())
    }

    /// Timeframe label used in alerts (e.g. "15m")
    pub fn timeframe_label(&self) -> String {
        format!("{}m", self.timeframe_minutes)
    }

    /// Symbols dropped from the scan universe: stables plus wrapped/staked
    /// variants that track another asset and never diverge on their own.
    pub fn excluded_symbols() -> &'static [&'static str] {
        &[
            "usdt", "usdc", "dai", "fdusd", "pyusd", "usde", "steth", "wbtc", "weth",
            "usds", "gusd", "wsteth", "wbeth", "weeth", "cbbtc", "usdt0", "susds",
            "susde", "usd1", "syrupusdc", "usdf", "jitosol", "usdg", "rlusd",
            "bfusd", "bnsol", "reth", "wbnb", "rseth", "fbtc", "lbtc",
            "gteth", "tusd", "tbtc", "eutbl", "usd0", "oseth", "geth",
            "solvbtc", "usdtb", "usdd", "lseth", "ustb", "usdc.e", "usdy",
            "clbtc", "meth", "usdai", "ezeth", "jupsol",
        ]
    }
}

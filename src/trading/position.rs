//! One simulated trade and its exit ladder
//!
//! A position opens at the signal bar's close with a fixed stop and three
//! take-profit tiers derived from the entry. Each scan cycle feeds it the
//! latest traded price and it advances at most one rung: tiers are checked
//! highest first and always before the stop, so an observation that straddles
//! several thresholds settles on the most favorable branch, and a trade that
//! already banked tier 1 can only exit at entry, never as a fresh loss.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScannerConfig;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Direction multiplier: +1 long, -1 short
    pub fn mult(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// A tracked simulated trade, keyed by pair symbol while open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: Side,
    pub entry: f64,
    /// Current stop; moves to `entry` once tier 1 is banked
    pub stop: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    pub tp1_hit: bool,
    pub tp2_hit: bool,
    /// Dollar risk carried by this trade
    pub risk_amount: f64,
    pub opened_at: DateTime<Utc>,
}

/// Outcome of feeding one price observation to a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionUpdate {
    /// No threshold crossed
    None,
    /// Tier 1 reached: stop moved to entry, position stays open
    Tp1Reached,
    /// Tier 2 reached, position stays open
    Tp2Reached,
    /// Position finished
    Closed(PositionClose),
}

/// Terminal outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionClose {
    /// Final target reached. `tp1_was_hit` tells the book whether the win was
    /// already counted when tier 1 banked.
    Tp3Win { tp1_was_hit: bool },
    /// Stopped at entry after tier 1 banked
    Breakeven,
    /// Initial stop hit
    Loss,
}

impl Position {
    /// Open a position at `entry`, deriving stop and targets from the config
    /// percentages (mirrored around entry by the side multiplier).
    pub fn open(
        symbol: String,
        side: Side,
        entry: f64,
        cfg: &ScannerConfig,
        opened_at: DateTime<Utc>,
    ) -> Self {
        let m = side.mult();
        Self {
            symbol,
            side,
            entry,
            stop: entry * (1.0 - cfg.sl_pct * m),
            tp1: entry * (1.0 + cfg.tp1_pct * m),
            tp2: entry * (1.0 + cfg.tp2_pct * m),
            tp3: entry * (1.0 + cfg.tp3_pct * m),
            tp1_hit: false,
            tp2_hit: false,
            risk_amount: cfg.risk_per_trade,
            opened_at,
        }
    }

    /// Price has reached `target` in the trade's favorable direction
    fn favorable(&self, price: f64, target: f64) -> bool {
        match self.side {
            Side::Long => price >= target,
            Side::Short => price <= target,
        }
    }

    /// Price has reached `level` against the trade
    fn adverse(&self, price: f64, level: f64) -> bool {
        match self.side {
            Side::Long => price <= level,
            Side::Short => price >= level,
        }
    }

    /// Advance the exit ladder against the latest traded price.
    pub fn apply_price(&mut self, price: f64) -> PositionUpdate {
        if self.favorable(price, self.tp3) {
            return PositionUpdate::Closed(PositionClose::Tp3Win {
                tp1_was_hit: self.tp1_hit,
            });
        }

        if !self.tp2_hit && self.favorable(price, self.tp2) {
            self.tp2_hit = true;
            return PositionUpdate::Tp2Reached;
        }

        if !self.tp1_hit && self.favorable(price, self.tp1) {
            self.tp1_hit = true;
            self.stop = self.entry;
            return PositionUpdate::Tp1Reached;
        }

        if self.adverse(price, self.stop) {
            return PositionUpdate::Closed(if self.tp1_hit {
                PositionClose::Breakeven
            } else {
                PositionClose::Loss
            });
        }

        PositionUpdate::None
    }
}

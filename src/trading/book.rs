//! Aggregate trade book: open positions plus running win/loss/balance stats
//!
//! This is the persisted record. Counters and balance move only here, on
//! lifecycle transitions, so a reload mid-ladder never double-counts.
//!
//! Profit bookkeeping treats the position as exiting in thirds: one third is
//! realized when tier 1 banks, tier 2 is flagged without a balance change, and
//! whatever is still open (all of it on a straight run to tier 3) is realized
//! at the final target. Each profit leg is sized in R-multiples of the
//! configured dollar risk; a stop-out before tier 1 debits exactly that risk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ScannerConfig;

use super::position::{Position, PositionClose, PositionUpdate};

/// What happened to a tracked position during one price update
#[derive(Debug, Clone, PartialEq)]
pub enum BookEvent {
    /// Tier 1 banked: win counted, stop moved to entry
    Tp1Banked { symbol: String, realized: f64 },
    /// Tier 2 flagged, no balance change
    Tp2Reached { symbol: String },
    /// Final target reached, position closed
    Tp3Closed { symbol: String, realized: f64 },
    /// Stopped at entry after tier 1, position closed flat
    BreakevenClosed { symbol: String },
    /// Initial stop hit, position closed for the risked amount
    StopClosed { symbol: String, lost: f64 },
}

/// Persisted scanner state: aggregate counters plus the active-set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeBook {
    pub wins: u32,
    pub losses: u32,
    pub balance: f64,
    pub active_trades: BTreeMap<String, Position>,
}

impl TradeBook {
    /// Fresh book with no history
    pub fn with_balance(balance: f64) -> Self {
        Self {
            wins: 0,
            losses: 0,
            balance,
            active_trades: BTreeMap::new(),
        }
    }

    /// Whether a symbol already carries an open position
    pub fn is_active(&self, symbol: &str) -> bool {
        self.active_trades.contains_key(symbol)
    }

    /// Track a new position. A symbol that is already active keeps its
    /// existing trade and the new one is dropped.
    pub fn open(&mut self, position: Position) -> bool {
        if self.is_active(&position.symbol) {
            return false;
        }
        self.active_trades.insert(position.symbol.clone(), position);
        true
    }

    /// Drive one open position against the latest price, applying counter and
    /// balance mutations. Terminal events also remove the position.
    pub fn update(&mut self, symbol: &str, price: f64, cfg: &ScannerConfig) -> Option<BookEvent> {
        let pos = self.active_trades.get_mut(symbol)?;
        let update = pos.apply_price(price);
        let risk = pos.risk_amount;

        match update {
            PositionUpdate::None => None,
            PositionUpdate::Tp1Reached => {
                let realized = risk * (cfg.tp1_pct / cfg.sl_pct) / 3.0;
                self.wins += 1;
                self.balance += realized;
                Some(BookEvent::Tp1Banked {
                    symbol: symbol.to_string(),
                    realized,
                })
            }
            PositionUpdate::Tp2Reached => Some(BookEvent::Tp2Reached {
                symbol: symbol.to_string(),
            }),
            PositionUpdate::Closed(close) => {
                self.active_trades.remove(symbol);
                match close {
                    PositionClose::Tp3Win { tp1_was_hit } => {
                        // Whatever fraction never exited at tier 1 exits here
                        let remaining = if tp1_was_hit { 2.0 / 3.0 } else { 1.0 };
                        let realized = risk * (cfg.tp3_pct / cfg.sl_pct) * remaining;
                        if !tp1_was_hit {
                            self.wins += 1;
                        }
                        self.balance += realized;
                        Some(BookEvent::Tp3Closed {
                            symbol: symbol.to_string(),
                            realized,
                        })
                    }
                    PositionClose::Breakeven => Some(BookEvent::BreakevenClosed {
                        symbol: symbol.to_string(),
                    }),
                    PositionClose::Loss => {
                        self.losses += 1;
                        self.balance -= risk;
                        Some(BookEvent::StopClosed {
                            symbol: symbol.to_string(),
                            lost: risk,
                        })
                    }
                }
            }
        }
    }
}

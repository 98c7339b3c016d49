//! Simulated position lifecycle and aggregate bookkeeping

pub mod book;
pub mod position;

pub use book::{BookEvent, TradeBook};
pub use position::{Position, PositionClose, PositionUpdate, Side};

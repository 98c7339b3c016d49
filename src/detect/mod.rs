//! Divergence detection
//!
//! Pivot extraction over close series plus the price/oscillator pattern
//! classifier. Both are pure functions of their inputs.

pub mod divergence;
pub mod pivots;

pub use divergence::{classify, Signal};
pub use pivots::{find_pivots, PivotKind};

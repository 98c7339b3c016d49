//! Price/oscillator divergence classification
//!
//! Compares the last few swing pivots of price against the oscillator values
//! printed on the same bars. Price rolling over while the oscillator firms up
//! reads bullish; the mirror reads bearish. The oscillator comparison is
//! always strict; price strictness is a config choice.

use crate::config::ScannerConfig;

use super::pivots::{find_pivots, PivotKind};

/// Classifier verdict for one pair at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Long,
    Short,
    None,
}

/// Classify the aligned (price, oscillator) series.
///
/// Both slices must already be trimmed to equal length with indices lined up
/// bar-for-bar. Anything that falls short of the pattern - too few samples,
/// too few pivots, broken monotonicity - yields `Signal::None`, never an
/// error.
pub fn classify(prices: &[f64], oscillator: &[f64], cfg: &ScannerConfig) -> Signal {
    if prices.len() != oscillator.len() || prices.len() < cfg.min_samples {
        return Signal::None;
    }

    let troughs = find_pivots(prices, cfg.pivot_order, PivotKind::Trough);
    if let Some(window) = last_n(&troughs, cfg.pivot_count) {
        let p: Vec<f64> = window.iter().map(|&i| prices[i]).collect();
        let r: Vec<f64> = window.iter().map(|&i| oscillator[i]).collect();
        // Price printing lower lows while the oscillator prints higher lows
        if falling(&p, cfg.strict_price_pivots) && rising(&r, true) {
            return Signal::Long;
        }
    }

    let peaks = find_pivots(prices, cfg.pivot_order, PivotKind::Peak);
    if let Some(window) = last_n(&peaks, cfg.pivot_count) {
        let p: Vec<f64> = window.iter().map(|&i| prices[i]).collect();
        let r: Vec<f64> = window.iter().map(|&i| oscillator[i]).collect();
        // Price printing higher highs while the oscillator prints lower highs
        if rising(&p, cfg.strict_price_pivots) && falling(&r, true) {
            return Signal::Short;
        }
    }

    Signal::None
}

/// Last `n` entries in chronological order, or None when fewer exist
fn last_n(indices: &[usize], n: usize) -> Option<&[usize]> {
    if n == 0 || indices.len() < n {
        return None;
    }
    Some(&indices[indices.len() - n..])
}

fn falling(values: &[f64], strict: bool) -> bool {
    values.windows(2).all(|w| if strict { w[1] < w[0] } else { w[1] <= w[0] })
}

fn rising(values: &[f64], strict: bool) -> bool {
    values.windows(2).all(|w| if strict { w[1] > w[0] } else { w[1] >= w[0] })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ScannerConfig {
        ScannerConfig {
            pivot_order: 1,
            pivot_count: 3,
            min_samples: 5,
            ..Default::default()
        }
    }

    /// Price troughs at indices 1, 3, 5 with the given values; oscillator
    /// carries the paired values on the same bars.
    fn series_with_troughs(p: [f64; 3], r: [f64; 3]) -> (Vec<f64>, Vec<f64>) {
        let prices = vec![20.0, p[0], 20.0, p[1], 20.0, p[2], 20.0];
        let osc = vec![50.0, r[0], 50.0, r[1], 50.0, r[2], 50.0];
        (prices, osc)
    }

    fn series_with_peaks(p: [f64; 3], r: [f64; 3]) -> (Vec<f64>, Vec<f64>) {
        let prices = vec![1.0, p[0], 1.0, p[1], 1.0, p[2], 1.0];
        let osc = vec![50.0, r[0], 50.0, r[1], 50.0, r[2], 50.0];
        (prices, osc)
    }

    #[test]
    fn test_bullish_divergence_returns_long() {
        let (prices, osc) = series_with_troughs([10.0, 8.0, 5.0], [30.0, 40.0, 55.0]);
        assert_eq!(classify(&prices, &osc, &cfg()), Signal::Long);
    }

    #[test]
    fn test_bearish_divergence_returns_short() {
        let (prices, osc) = series_with_peaks([5.0, 8.0, 10.0], [55.0, 40.0, 30.0]);
        assert_eq!(classify(&prices, &osc, &cfg()), Signal::Short);
    }

    #[test]
    fn test_non_monotonic_oscillator_returns_none() {
        let (prices, osc) = series_with_troughs([10.0, 8.0, 5.0], [30.0, 25.0, 55.0]);
        assert_eq!(classify(&prices, &osc, &cfg()), Signal::None);
    }

    #[test]
    fn test_non_monotonic_price_returns_none() {
        let (prices, osc) = series_with_troughs([8.0, 10.0, 5.0], [30.0, 40.0, 55.0]);
        assert_eq!(classify(&prices, &osc, &cfg()), Signal::None);
    }

    #[test]
    fn test_classifier_is_idempotent() {
        let (prices, osc) = series_with_troughs([10.0, 8.0, 5.0], [30.0, 40.0, 55.0]);
        let first = classify(&prices, &osc, &cfg());
        assert_eq!(classify(&prices, &osc, &cfg()), first);
    }

    #[test]
    fn test_min_samples_guard() {
        let (prices, osc) = series_with_troughs([10.0, 8.0, 5.0], [30.0, 40.0, 55.0]);
        let strict_cfg = ScannerConfig {
            min_samples: 100,
            ..cfg()
        };
        assert_eq!(classify(&prices, &osc, &strict_cfg), Signal::None);
    }

    #[test]
    fn test_too_few_pivots_returns_none() {
        // Only two troughs but the pattern needs three
        let prices = vec![20.0, 10.0, 20.0, 8.0, 20.0];
        let osc = vec![50.0, 30.0, 50.0, 40.0, 50.0];
        assert_eq!(classify(&prices, &osc, &cfg()), Signal::None);
    }

    #[test]
    fn test_mismatched_lengths_return_none() {
        let (prices, osc) = series_with_troughs([10.0, 8.0, 5.0], [30.0, 40.0, 55.0]);
        assert_eq!(classify(&prices[1..], &osc, &cfg()), Signal::None);
    }

    #[test]
    fn test_equal_lows_depend_on_strictness() {
        // Two troughs print the same low; strict rejects, relaxed accepts
        let (prices, osc) = series_with_troughs([10.0, 10.0, 8.0], [30.0, 40.0, 55.0]);
        assert_eq!(classify(&prices, &osc, &cfg()), Signal::None);

        let relaxed = ScannerConfig {
            strict_price_pivots: false,
            ..cfg()
        };
        assert_eq!(classify(&prices, &osc, &relaxed), Signal::Long);
    }

    #[test]
    fn test_only_last_pivots_considered() {
        // Early trough breaks monotonicity but falls outside the 3-pivot window
        let prices = vec![20.0, 2.0, 20.0, 10.0, 20.0, 8.0, 20.0, 5.0, 20.0];
        let osc = vec![50.0, 90.0, 50.0, 30.0, 50.0, 40.0, 50.0, 55.0, 50.0];
        assert_eq!(classify(&prices, &osc, &cfg()), Signal::Long);
    }
}

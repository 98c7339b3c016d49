//! Momentum oscillator input for the divergence detector
//!
//! Wilder-smoothed RSI over a close series. Output stays aligned
//! index-for-index with the input: the first `period` entries are NaN warm-up,
//! the same convention dataframe indicator libraries use, so price and
//! oscillator can be trimmed in lockstep afterwards.

/// RSI of `closes` with Wilder smoothing.
///
/// Entries before index `period` are NaN; everything after is in [0, 100].
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    // Seed the averages with a simple mean over the first window
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = rs_to_rsi(avg_gain, avg_loss);

    // Wilder smoothing from there on
    let w = period as f64;
    for i in period + 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (w - 1.0) + gain) / w;
        avg_loss = (avg_loss * (w - 1.0) + loss) / w;
        out[i] = rs_to_rsi(avg_gain, avg_loss);
    }

    out
}

fn rs_to_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Drop the oscillator's warm-up prefix from both series in lockstep so pivot
/// indices keep lining up bar-for-bar.
pub fn trim_warmup(prices: &[f64], oscillator: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let start = oscillator
        .iter()
        .take_while(|v| !v.is_finite())
        .count()
        .min(prices.len());
    (prices[start..].to_vec(), oscillator[start..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_prefix_is_nan() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + (i % 7) as f64).collect();
        let out = rsi(&closes, 14);
        assert_eq!(out.len(), closes.len());
        assert!(out[..14].iter().all(|v| v.is_nan()));
        assert!(out[14..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_values_stay_bounded() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 50.0 + 10.0 * ((i as f64) * 0.7).sin())
            .collect();
        for v in rsi(&closes, 14).iter().filter(|v| v.is_finite()) {
            assert!((0.0..=100.0).contains(v), "out of range: {v}");
        }
    }

    #[test]
    fn test_straight_rally_pins_at_100() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&closes, 14);
        assert_eq!(out[29], 100.0);
    }

    #[test]
    fn test_selloff_drops_below_rally() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let rally = rsi(&closes, 14)[29];
        closes.extend((0..10).map(|i| 129.0 - 2.0 * i as f64));
        let after = rsi(&closes, 14)[39];
        assert!(after < rally);
        assert!(after < 50.0);
    }

    #[test]
    fn test_series_shorter_than_period_is_all_nan() {
        let closes = [100.0, 101.0, 102.0];
        assert!(rsi(&closes, 14).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_trim_warmup_stays_aligned() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
        let osc = [f64::NAN, f64::NAN, 60.0, 55.0, 50.0];
        let (p, o) = trim_warmup(&prices, &osc);
        assert_eq!(p, vec![3.0, 4.0, 5.0]);
        assert_eq!(o, vec![60.0, 55.0, 50.0]);
    }

    #[test]
    fn test_trim_warmup_without_nan_prefix_is_identity() {
        let prices = [1.0, 2.0];
        let osc = [40.0, 45.0];
        let (p, o) = trim_warmup(&prices, &osc);
        assert_eq!(p, prices.to_vec());
        assert_eq!(o, osc.to_vec());
    }
}

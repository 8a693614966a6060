//! Average True Range over the entire history.
//!
//! TR[i] = max(H[i] - L[i], |H[i] - C[i-1]|, |L[i] - C[i-1]|) for i >= 1,
//! ATR = mean(TR). The period is accepted for call-site symmetry with the
//! other indicators but does not narrow the window.

use crate::domain::ohlcv::Candle;

pub const DEFAULT_ATR_PERIOD: usize = 14;

pub fn calculate_atr(candles: &[Candle], _period: usize) -> f64 {
    if candles.len() < 2 {
        return 0.0;
    }

    let total: f64 = candles
        .windows(2)
        .map(|pair| pair[1].true_range(pair[0].close))
        .sum();
    total / (candles.len() - 1) as f64
}

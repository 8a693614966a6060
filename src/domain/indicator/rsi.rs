//! RSI (Relative Strength Index) over the most recent window.
//!
//! Simple averages, no Wilder smoothing: the last `n` close-to-close changes
//! are split into gains and losses and each sum is divided by `n`.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Fewer than `n` candles yields the neutral value 50.

use crate::domain::ohlcv::Candle;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Returned when the history is too short to measure momentum.
pub const RSI_NEUTRAL: f64 = 50.0;

pub fn calculate_rsi(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period {
        return RSI_NEUTRAL;
    }

    // The first candle has no predecessor, so a window that reaches index 0
    // contributes one change fewer.
    let start = (candles.len() - period).max(1);

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in start..candles.len() {
        let change = candles[i].close - candles[i - 1].close;
        if change >= 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}

/// RSI at every bar: element `i` equals `calculate_rsi(&candles[..=i], period)`.
pub fn rsi_series(candles: &[Candle], period: usize) -> Vec<f64> {
    (1..=candles.len())
        .map(|n| calculate_rsi(&candles[..n], period))
        .collect()
}

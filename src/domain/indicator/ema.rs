//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the close of the first candle in the slice, then
//! EMA[i] = (C[i] - EMA[i-1]) * k + EMA[i-1] over the whole history.
//! Fewer than `n` candles returns the last close unchanged.

use crate::domain::ohlcv::Candle;

pub fn calculate_ema(candles: &[Candle], period: usize) -> f64 {
    let Some(last) = candles.last() else {
        return 0.0;
    };
    if period == 0 || candles.len() < period {
        return last.close;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = candles[0].close;
    for candle in &candles[1..] {
        ema = (candle.close - ema) * k + ema;
    }
    ema
}

/// EMA at every bar: element `i` equals `calculate_ema(&candles[..=i], period)`.
pub fn ema_series(candles: &[Candle], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            ema = if i == 0 {
                candle.close
            } else {
                (candle.close - ema) * k + ema
            };
            if period == 0 || i + 1 < period {
                candle.close
            } else {
                ema
            }
        })
        .collect()
}

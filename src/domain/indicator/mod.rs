//! Scalar technical indicators over a candle slice.
//!
//! Each indicator returns a single `f64` describing the latest state of the
//! series. Short histories never fail: every indicator has a defined fallback
//! value instead.

pub mod atr;
pub mod ema;
pub mod rsi;

use std::fmt;

use crate::domain::ohlcv::Candle;

pub use atr::{calculate_atr, DEFAULT_ATR_PERIOD};
pub use ema::{calculate_ema, ema_series};
pub use rsi::{calculate_rsi, rsi_series, DEFAULT_RSI_PERIOD, RSI_NEUTRAL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Rsi(usize),
    Ema(usize),
    Atr(usize),
}

impl IndicatorType {
    pub fn compute(&self, candles: &[Candle]) -> f64 {
        match *self {
            IndicatorType::Rsi(period) => calculate_rsi(candles, period),
            IndicatorType::Ema(period) => calculate_ema(candles, period),
            IndicatorType::Atr(period) => calculate_atr(candles, period),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}

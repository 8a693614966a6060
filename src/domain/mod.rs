//! Core domain types and logic.

pub mod ohlcv;
pub mod timeframe;
pub mod indicator;
pub mod signal;
pub mod prediction;
pub mod risk;
pub mod strategy;
pub mod config_validation;
pub mod error;

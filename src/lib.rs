//! Forward trading signals from OHLCV candles.
//!
//! Hexagonal architecture: indicator and prediction logic in [`domain`], port
//! traits in [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;

//! Candle source port trait.

use crate::domain::error::CandlecastError;
use crate::domain::ohlcv::CandleSeries;
use crate::domain::timeframe::InstrumentInfo;
use chrono::NaiveDateTime;

pub trait DataPort {
    /// Load candles, keeping only those within the inclusive bounds.
    fn fetch_candles(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<CandleSeries, CandlecastError>;

    fn instrument(&self) -> InstrumentInfo;
}

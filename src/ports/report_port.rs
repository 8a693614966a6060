//! Report generation port trait.

use std::path::Path;

use crate::domain::error::CandlecastError;
use crate::domain::prediction::Forecast;
use crate::domain::risk::PositionPlan;
use crate::domain::signal::Signal;
use crate::domain::timeframe::InstrumentInfo;

/// Everything a report writer renders for one run.
#[derive(Debug, Clone)]
pub struct ForecastReport<'a> {
    pub instrument: &'a InstrumentInfo,
    pub candle_count: usize,
    pub forecast: &'a Forecast,
    /// One entry per signal when an account balance is configured.
    pub plans: Option<Vec<PositionPlan>>,
}

/// Historical triggers found by one scanner.
#[derive(Debug, Clone)]
pub struct ScanReport<'a> {
    pub instrument: &'a InstrumentInfo,
    pub strategy: &'a str,
    pub candle_count: usize,
    pub signals: &'a [Signal],
}

/// Port for writing forecast and scan reports.
pub trait ReportPort {
    /// Write to `output_path`, or to stdout when it is `None`.
    fn write(
        &self,
        report: &ForecastReport<'_>,
        output_path: Option<&Path>,
    ) -> Result<(), CandlecastError>;

    fn write_scan(
        &self,
        report: &ScanReport<'_>,
        output_path: Option<&Path>,
    ) -> Result<(), CandlecastError>;
}

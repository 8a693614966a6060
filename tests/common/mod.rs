#![allow(dead_code)]

use candlecast::domain::error::CandlecastError;
pub use candlecast::domain::ohlcv::{Candle, CandleSeries};
use candlecast::domain::timeframe::InstrumentInfo;
use candlecast::ports::data_port::DataPort;
use candlecast::ports::report_port::{ForecastReport, ReportPort, ScanReport};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::path::Path;

pub struct MockDataPort {
    pub candles: Vec<Candle>,
    pub instrument: InstrumentInfo,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles,
            instrument: InstrumentInfo::from_file_stem("EURUSD_M15"),
            error: None,
        }
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<CandleSeries, CandlecastError> {
        if let Some(reason) = &self.error {
            return Err(CandlecastError::CsvParse {
                line: 2,
                reason: reason.clone(),
            });
        }
        let candles = self
            .candles
            .iter()
            .filter(|c| start.is_none_or(|s| c.timestamp >= s))
            .filter(|c| end.is_none_or(|e| c.timestamp <= e))
            .cloned()
            .collect();
        CandleSeries::new(candles)
    }

    fn instrument(&self) -> InstrumentInfo {
        self.instrument.clone()
    }
}

/// Captures what the pipeline hands to the report writer.
#[derive(Default)]
pub struct RecordingReportPort {
    pub candle_counts: RefCell<Vec<usize>>,
    pub signal_counts: RefCell<Vec<usize>>,
    pub plan_counts: RefCell<Vec<Option<usize>>>,
    pub scans: RefCell<Vec<(String, usize)>>,
}

impl ReportPort for RecordingReportPort {
    fn write(
        &self,
        report: &ForecastReport<'_>,
        _output_path: Option<&Path>,
    ) -> Result<(), CandlecastError> {
        self.candle_counts.borrow_mut().push(report.candle_count);
        self.signal_counts
            .borrow_mut()
            .push(report.forecast.signals.len());
        self.plan_counts
            .borrow_mut()
            .push(report.plans.as_ref().map(Vec::len));
        Ok(())
    }

    fn write_scan(
        &self,
        report: &ScanReport<'_>,
        _output_path: Option<&Path>,
    ) -> Result<(), CandlecastError> {
        self.candle_counts.borrow_mut().push(report.candle_count);
        self.scans
            .borrow_mut()
            .push((report.strategy.to_string(), report.signals.len()));
        Ok(())
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 19)
        .unwrap()
        .and_hms_opt(15, 15, 0)
        .unwrap()
}

pub fn make_candle(index: usize, close: f64) -> Candle {
    Candle {
        timestamp: start_time() + Duration::minutes(15 * index as i64),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1000.0,
    }
}

pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_candle(i, close))
        .collect()
}

pub fn make_series(closes: &[f64]) -> CandleSeries {
    CandleSeries::new(make_candles(closes)).unwrap()
}

/// `count` candles rising by `step` from `start_price`.
pub fn generate_trend(count: usize, start_price: f64, step: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| make_candle(i, start_price + step * i as f64))
        .collect()
}

pub const SAMPLE_CSV: &str = "Date,Time,Open,High,Low,Close,Volume,Openint\n\
    2025-05-19,15:15:00,4.4384,4.4857,4.4384,4.4713,105825.35994,0\n";

/// Render candles in the ingestion CSV layout.
pub fn to_csv(candles: &[Candle]) -> String {
    let mut out = String::from("Date,Time,Open,High,Low,Close,Volume,Openint\n");
    for c in candles {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},0\n",
            c.timestamp.format("%Y-%m-%d"),
            c.timestamp.format("%H:%M:%S"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        ));
    }
    out
}

//! CSV report adapter: one row per signal.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::domain::error::CandlecastError;
use crate::ports::report_port::{ForecastReport, ReportPort, ScanReport};

const HEADER: [&str; 14] = [
    "symbol",
    "timeframe",
    "horizon",
    "timestamp",
    "direction",
    "entry",
    "stop_loss",
    "target_1",
    "target_2",
    "target_3",
    "confidence",
    "rsi",
    "atr",
    "units",
];

const SCAN_HEADER: [&str; 11] = [
    "symbol",
    "timeframe",
    "strategy",
    "timestamp",
    "direction",
    "entry",
    "stop_loss",
    "target_1",
    "target_2",
    "target_3",
    "rationale",
];

#[derive(Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn write_to<W: Write>(&self, report: &ForecastReport<'_>, sink: W) -> Result<(), CandlecastError> {
        let mut wtr = csv::Writer::from_writer(sink);
        wtr.write_record(HEADER).map_err(report_error)?;

        let symbol = report.instrument.symbol_label();
        let timeframe = report.instrument.timeframe_label();
        let snapshot = &report.forecast.snapshot;

        for (i, signal) in report.forecast.signals.iter().enumerate() {
            let units = report
                .plans
                .as_ref()
                .and_then(|plans| plans.get(i))
                .map(|plan| plan.units.to_string())
                .unwrap_or_default();

            wtr.write_record([
                symbol.to_string(),
                timeframe.clone(),
                signal.horizon.to_string(),
                signal.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                signal.direction.to_string(),
                signal.entry_price.to_string(),
                signal.stop_loss.to_string(),
                signal.targets[0].to_string(),
                signal.targets[1].to_string(),
                signal.targets[2].to_string(),
                signal.confidence.to_string(),
                snapshot.rsi.to_string(),
                snapshot.atr.to_string(),
                units,
            ])
            .map_err(report_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl CsvReportAdapter {
    pub fn write_scan_to<W: Write>(&self, report: &ScanReport<'_>, sink: W) -> Result<(), CandlecastError> {
        let mut wtr = csv::Writer::from_writer(sink);
        wtr.write_record(SCAN_HEADER).map_err(report_error)?;

        let symbol = report.instrument.symbol_label();
        let timeframe = report.instrument.timeframe_label();
        for signal in report.signals {
            wtr.write_record([
                symbol.to_string(),
                timeframe.clone(),
                report.strategy.to_string(),
                signal.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                signal.direction.to_string(),
                signal.entry_price.to_string(),
                signal.stop_loss.to_string(),
                signal.targets[0].to_string(),
                signal.targets[1].to_string(),
                signal.targets[2].to_string(),
                signal.rationale.join("; "),
            ])
            .map_err(report_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn create(path: &Path) -> Result<File, CandlecastError> {
    File::create(path).map_err(|e| CandlecastError::Report {
        reason: format!("failed to create {}: {}", path.display(), e),
    })
}

fn report_error(e: csv::Error) -> CandlecastError {
    CandlecastError::Report {
        reason: format!("CSV write error: {}", e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        report: &ForecastReport<'_>,
        output_path: Option<&Path>,
    ) -> Result<(), CandlecastError> {
        match output_path {
            Some(path) => self.write_to(report, create(path)?),
            None => self.write_to(report, io::stdout().lock()),
        }
    }

    fn write_scan(
        &self,
        report: &ScanReport<'_>,
        output_path: Option<&Path>,
    ) -> Result<(), CandlecastError> {
        match output_path {
            Some(path) => self.write_scan_to(report, create(path)?),
            None => self.write_scan_to(report, io::stdout().lock()),
        }
    }
}

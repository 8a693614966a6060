//! Plain-text report adapter implementing ReportPort.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::domain::error::CandlecastError;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::{ForecastReport, ReportPort, ScanReport};

pub struct TextReportAdapter {
    precision: usize,
    show_rationale: bool,
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self {
            precision: 4,
            show_rationale: true,
        }
    }
}

impl TextReportAdapter {
    /// Reads `[report] precision` and `[report] rationale`.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let defaults = Self::default();
        Self {
            precision: config
                .get_int("report", "precision", defaults.precision as i64)
                .clamp(0, 10) as usize,
            show_rationale: config.get_bool("report", "rationale", defaults.show_rationale),
        }
    }

    pub fn render(&self, report: &ForecastReport<'_>) -> String {
        let p = self.precision;
        let forecast = report.forecast;
        let snap = &forecast.snapshot;
        let yes_no = |b: bool| if b { "yes" } else { "no" };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Forecast for {} ({}), {} candles",
            report.instrument.symbol_label(),
            report.instrument.timeframe_label(),
            report.candle_count
        );
        let _ = writeln!(out, "Last close:   {:.p$}", forecast.last_close);
        let _ = writeln!(
            out,
            "Indicators:   RSI {:.2}  EMA fast {:.p$}  EMA slow {:.p$}  ATR {:.p$}",
            snap.rsi, snap.ema_fast, snap.ema_slow, snap.atr
        );
        let _ = writeln!(
            out,
            "Market state: uptrend {}, oversold {}, overbought {}",
            yes_no(forecast.state.uptrend),
            yes_no(forecast.state.oversold),
            yes_no(forecast.state.overbought)
        );

        if forecast.signals.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "No signals: entry price is not positive");
        }

        for (i, signal) in forecast.signals.iter().enumerate() {
            let rr = signal.risk_rewards();
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "#{}  {} ({})  {}  confidence {:.0}%",
                signal.horizon,
                signal.timestamp.format("%Y-%m-%d"),
                signal.display_time(),
                signal.direction,
                signal.confidence * 100.0
            );
            let _ = writeln!(
                out,
                "    entry {:.p$}  stop {:.p$}",
                signal.entry_price, signal.stop_loss
            );
            let _ = writeln!(
                out,
                "    targets {:.p$} / {:.p$} / {:.p$}  (R:R {:.2} / {:.2} / {:.2})",
                signal.targets[0],
                signal.targets[1],
                signal.targets[2],
                rr[0],
                rr[1],
                rr[2]
            );
            if let Some(plan) = report.plans.as_ref().and_then(|plans| plans.get(i)) {
                let _ = writeln!(
                    out,
                    "    size {:.2} units, risk {:.2}, profit at targets {:.2} / {:.2} / {:.2}",
                    plan.units,
                    plan.risk_amount,
                    plan.target_profits[0],
                    plan.target_profits[1],
                    plan.target_profits[2]
                );
            }
            if self.show_rationale {
                let _ = writeln!(out, "    confirmation: {}", signal.rationale.join("; "));
            }
        }
        out
    }

    /// One line per historical trigger.
    pub fn render_scan(&self, report: &ScanReport<'_>) -> String {
        let p = self.precision;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Scan {} on {} ({}), {} candles, {} signals",
            report.strategy,
            report.instrument.symbol_label(),
            report.instrument.timeframe_label(),
            report.candle_count,
            report.signals.len()
        );

        for signal in report.signals {
            let _ = write!(
                out,
                "{}  {:<4}  entry {:.p$}  stop {:.p$}  targets {:.p$} / {:.p$} / {:.p$}",
                signal.timestamp.format("%Y-%m-%d %H:%M"),
                signal.direction.to_string(),
                signal.entry_price,
                signal.stop_loss,
                signal.targets[0],
                signal.targets[1],
                signal.targets[2]
            );
            if self.show_rationale && !signal.rationale.is_empty() {
                let _ = write!(out, "  ({})", signal.rationale.join("; "));
            }
            let _ = writeln!(out);
        }
        out
    }
}

fn emit(text: &str, output_path: Option<&Path>) -> Result<(), CandlecastError> {
    match output_path {
        Some(path) => fs::write(path, text).map_err(|e| CandlecastError::Report {
            reason: format!("failed to write {}: {}", path.display(), e),
        }),
        None => io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .map_err(CandlecastError::Io),
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        report: &ForecastReport<'_>,
        output_path: Option<&Path>,
    ) -> Result<(), CandlecastError> {
        emit(&self.render(report), output_path)
    }

    fn write_scan(
        &self,
        report: &ScanReport<'_>,
        output_path: Option<&Path>,
    ) -> Result<(), CandlecastError> {
        emit(&self.render_scan(report), output_path)
    }
}

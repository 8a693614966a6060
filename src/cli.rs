//! CLI definition and dispatch.

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::config_validation::{
    validate_account_balance, validate_prediction_config, validate_risk_config, validate_risk_pct,
    validate_strategy_config,
};
use crate::domain::error::CandlecastError;
use crate::domain::indicator::IndicatorType;
use crate::domain::prediction::{analyze, Forecast, PredictionConfig};
use crate::domain::risk::{RiskSettings, DEFAULT_RISK_PCT};
use crate::domain::signal::Signal;
use crate::domain::strategy::{MaCrossoverStrategy, RsiEmaStrategy, Strategy, StrategyKind};
use crate::domain::timeframe::{InstrumentInfo, Timeframe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ForecastReport, ReportPort, ScanReport};

#[derive(Parser, Debug)]
#[command(name = "candlecast", about = "Forward trading signals from OHLCV candles")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Csv,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate forward signals from a candle file
    Predict {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        timeframe: Option<Timeframe>,
        /// Ignore candles before this date or timestamp
        #[arg(long)]
        from: Option<String>,
        /// Ignore candles after this date or timestamp
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Account balance used for position sizing
        #[arg(long)]
        balance: Option<f64>,
        /// Percent of the balance risked per signal
        #[arg(long)]
        risk_pct: Option<f64>,
    },
    /// List historical signals found by a strategy scanner
    Scan {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// rsi_ema or ma_crossover
        #[arg(short, long)]
        strategy: StrategyKind,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the latest indicator readings and market state
    Indicators {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show instrument metadata and candle range
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that override the config file.
#[derive(Debug, Default)]
pub struct PredictOverrides {
    pub symbol: Option<String>,
    pub timeframe: Option<Timeframe>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub balance: Option<f64>,
    pub risk_pct: Option<f64>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Predict {
            data,
            config,
            symbol,
            timeframe,
            from,
            to,
            format,
            output,
            balance,
            risk_pct,
        } => {
            let overrides = PredictOverrides {
                symbol,
                timeframe,
                from,
                to,
                balance,
                risk_pct,
            };
            run_predict(
                data.as_deref(),
                config.as_deref(),
                &overrides,
                format,
                output.as_deref(),
            )
        }
        Command::Scan {
            data,
            config,
            strategy,
            from,
            to,
            format,
            output,
        } => run_scan(
            data.as_deref(),
            config.as_deref(),
            strategy,
            (from.as_deref(), to.as_deref()),
            format,
            output.as_deref(),
        ),
        Command::Indicators { data, config } => run_indicators(data.as_deref(), config.as_deref()),
        Command::Info { data } => run_info(&data),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &CandlecastError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, CandlecastError> {
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn section_usize(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    config.get_int(section, key, default as i64).max(0) as usize
}

fn config_usize(config: &dyn ConfigPort, key: &str, default: usize) -> usize {
    section_usize(config, "prediction", key, default)
}

/// Validate the `[prediction]` section and build the engine parameters.
pub fn build_prediction_config(
    config: &dyn ConfigPort,
) -> Result<PredictionConfig, CandlecastError> {
    validate_prediction_config(config)?;
    let d = PredictionConfig::default();

    Ok(PredictionConfig {
        rsi_period: config_usize(config, "rsi_period", d.rsi_period),
        ema_fast_period: config_usize(config, "ema_fast_period", d.ema_fast_period),
        ema_slow_period: config_usize(config, "ema_slow_period", d.ema_slow_period),
        atr_period: config_usize(config, "atr_period", d.atr_period),
        oversold: config.get_double("prediction", "oversold", d.oversold),
        overbought: config.get_double("prediction", "overbought", d.overbought),
        atr_multiplier: config.get_double("prediction", "atr_multiplier", d.atr_multiplier),
        stop_pct: config.get_double("prediction", "stop_pct", d.stop_pct),
        target_step_pct: config.get_double("prediction", "target_step_pct", d.target_step_pct),
        horizons: config
            .get_int("prediction", "horizons", i64::from(d.horizons))
            .try_into()
            .unwrap_or(d.horizons),
        horizon_hours: config.get_int("prediction", "horizon_hours", d.horizon_hours),
        signal_confidence: config.get_double(
            "prediction",
            "signal_confidence",
            d.signal_confidence,
        ),
        neutral_confidence: config.get_double(
            "prediction",
            "neutral_confidence",
            d.neutral_confidence,
        ),
    })
}

/// Validate the scanner's section and build it.
pub fn build_strategy(
    kind: StrategyKind,
    config: &dyn ConfigPort,
) -> Result<Box<dyn Strategy>, CandlecastError> {
    validate_strategy_config(config, kind)?;
    let section = kind.section();

    Ok(match kind {
        StrategyKind::RsiEma => {
            let d = RsiEmaStrategy::default();
            Box::new(RsiEmaStrategy {
                rsi_period: section_usize(config, section, "rsi_period", d.rsi_period),
                ema_period: section_usize(config, section, "ema_period", d.ema_period),
                rsi_buy: config.get_double(section, "rsi_buy", d.rsi_buy),
                rsi_sell: config.get_double(section, "rsi_sell", d.rsi_sell),
            })
        }
        StrategyKind::MaCrossover => {
            let d = MaCrossoverStrategy::default();
            Box::new(MaCrossoverStrategy {
                short_period: section_usize(config, section, "short_period", d.short_period),
                long_period: section_usize(config, section, "long_period", d.long_period),
                rsi_period: section_usize(config, section, "rsi_period", d.rsi_period),
            })
        }
    })
}

/// Validate the `[risk]` section, then apply command-line overrides.
pub fn build_risk_settings(
    config: &dyn ConfigPort,
    balance_override: Option<f64>,
    risk_pct_override: Option<f64>,
) -> Result<RiskSettings, CandlecastError> {
    validate_risk_config(config)?;

    let account_balance = balance_override.or_else(|| {
        config
            .get_string("risk", "account_balance")
            .map(|_| config.get_double("risk", "account_balance", f64::NAN))
    });
    if let Some(balance) = account_balance {
        validate_account_balance(balance)?;
    }

    let risk_pct = risk_pct_override
        .unwrap_or_else(|| config.get_double("risk", "risk_pct", DEFAULT_RISK_PCT));
    validate_risk_pct(risk_pct)?;

    Ok(RiskSettings {
        account_balance,
        risk_pct,
    })
}

/// `--data` wins over `[data] path`.
pub fn resolve_data_path(data: Option<&Path>, config: &dyn ConfigPort) -> Option<PathBuf> {
    data.map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "path").map(PathBuf::from))
}

/// Merge inferred metadata with config and command-line overrides, in
/// increasing priority.
pub fn resolve_instrument(
    inferred: InstrumentInfo,
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
    timeframe_override: Option<Timeframe>,
) -> Result<InstrumentInfo, CandlecastError> {
    let config_timeframe = config
        .get_string("data", "timeframe")
        .map(|s| s.parse::<Timeframe>())
        .transpose()?;

    Ok(InstrumentInfo {
        symbol: symbol_override
            .map(str::to_string)
            .or_else(|| config.get_string("data", "symbol"))
            .or(inferred.symbol),
        timeframe: timeframe_override
            .or(config_timeframe)
            .or(inferred.timeframe),
    })
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD HH:MM:SS`. A bare
/// date maps to midnight, or to the last second of the day for an end bound.
pub fn parse_bound(value: &str, end_of_day: bool) -> Result<NaiveDateTime, CandlecastError> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        CandlecastError::ConfigInvalid {
            section: "data".into(),
            key: (if end_of_day { "to" } else { "from" }).into(),
            reason: format!("invalid timestamp '{}' (expected YYYY-MM-DD[ HH:MM[:SS]])", value),
        }
    })?;
    let (h, m, s) = if end_of_day { (23, 59, 59) } else { (0, 0, 0) };
    date.and_hms_opt(h, m, s)
        .ok_or_else(|| CandlecastError::ConfigInvalid {
            section: "data".into(),
            key: "from".into(),
            reason: format!("invalid timestamp '{}'", value),
        })
}

fn parse_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(Option<NaiveDateTime>, Option<NaiveDateTime>), CandlecastError> {
    let start = from.map(|s| parse_bound(s, false)).transpose()?;
    let end = to.map(|s| parse_bound(s, true)).transpose()?;
    Ok((start, end))
}

/// Stages shared by `predict` and `indicators`: fetch, check, analyze.
pub fn forecast_from_port(
    data_port: &dyn DataPort,
    config: &PredictionConfig,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<(usize, Forecast), CandlecastError> {
    let series = data_port.fetch_candles(start, end)?;
    let instrument = data_port.instrument();
    if series.is_empty() {
        return Err(CandlecastError::EmptyData {
            source_name: instrument.symbol_label().to_string(),
        });
    }
    let forecast = analyze(&series, config)?;

    if series.len() < config.ema_slow_period {
        warn!(
            "Only {} candles; {} falls back to the last close",
            series.len(),
            IndicatorType::Ema(config.ema_slow_period)
        );
    }
    debug!(signals = forecast.signals.len(), "forecast ready");
    Ok((series.len(), forecast))
}

/// Run the predict pipeline against arbitrary ports.
pub fn run_predict_pipeline(
    data_port: &dyn DataPort,
    instrument: &InstrumentInfo,
    config: &PredictionConfig,
    risk: &RiskSettings,
    range: (Option<NaiveDateTime>, Option<NaiveDateTime>),
    report_port: &dyn ReportPort,
    output_path: Option<&Path>,
) -> Result<Forecast, CandlecastError> {
    let (candle_count, forecast) = forecast_from_port(data_port, config, range.0, range.1)?;

    let plans = risk.account_balance.map(|_| {
        forecast
            .signals
            .iter()
            .filter_map(|signal| risk.plan(signal))
            .collect()
    });

    let report = ForecastReport {
        instrument,
        candle_count,
        forecast: &forecast,
        plans,
    };
    report_port.write(&report, output_path)?;
    if let Some(path) = output_path {
        info!("Report written to: {}", path.display());
    }
    Ok(forecast)
}

/// Run a strategy scan against arbitrary ports.
pub fn run_scan_pipeline(
    data_port: &dyn DataPort,
    instrument: &InstrumentInfo,
    strategy: &dyn Strategy,
    levels: &PredictionConfig,
    range: (Option<NaiveDateTime>, Option<NaiveDateTime>),
    report_port: &dyn ReportPort,
    output_path: Option<&Path>,
) -> Result<Vec<Signal>, CandlecastError> {
    let series = data_port.fetch_candles(range.0, range.1)?;
    if series.is_empty() {
        return Err(CandlecastError::EmptyData {
            source_name: instrument.symbol_label().to_string(),
        });
    }

    let signals = strategy.scan(&series, levels);
    info!(
        "{} found {} signals in {} candles",
        strategy.name(),
        signals.len(),
        series.len()
    );

    let report = ScanReport {
        instrument,
        strategy: strategy.name(),
        candle_count: series.len(),
        signals: &signals,
    };
    report_port.write_scan(&report, output_path)?;
    if let Some(path) = output_path {
        info!("Report written to: {}", path.display());
    }
    Ok(signals)
}

fn run_predict(
    data: Option<&Path>,
    config_path: Option<&Path>,
    overrides: &PredictOverrides,
    format: ReportFormat,
    output: Option<&Path>,
) -> ExitCode {
    // Stage 1: Load and validate config
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let prediction_config = match build_prediction_config(&config) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let risk = match build_risk_settings(&config, overrides.balance, overrides.risk_pct) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    // Stage 2: Resolve data source and instrument
    let Some(path) = resolve_data_path(data, &config) else {
        eprintln!("error: no data file (use --data or set [data] path)");
        return ExitCode::from(2);
    };
    let adapter = CsvAdapter::new(path);
    let instrument = match resolve_instrument(
        adapter.instrument(),
        &config,
        overrides.symbol.as_deref(),
        overrides.timeframe,
    ) {
        Ok(i) => i,
        Err(e) => return fail(&e),
    };
    let adapter = adapter.with_instrument(instrument.clone());

    let range = match parse_range(overrides.from.as_deref(), overrides.to.as_deref()) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    // Stage 3: Forecast and report
    info!(
        "Forecasting {} ({}) from {}",
        instrument.symbol_label(),
        instrument.timeframe_label(),
        adapter.path().display()
    );
    let report_port: Box<dyn ReportPort> = match format {
        ReportFormat::Text => Box::new(TextReportAdapter::from_config(&config)),
        ReportFormat::Csv => Box::new(CsvReportAdapter),
    };

    match run_predict_pipeline(
        &adapter,
        &instrument,
        &prediction_config,
        &risk,
        range,
        report_port.as_ref(),
        output,
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn run_scan(
    data: Option<&Path>,
    config_path: Option<&Path>,
    kind: StrategyKind,
    (from, to): (Option<&str>, Option<&str>),
    format: ReportFormat,
    output: Option<&Path>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let levels = match build_prediction_config(&config) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let strategy = match build_strategy(kind, &config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let Some(path) = resolve_data_path(data, &config) else {
        eprintln!("error: no data file (use --data or set [data] path)");
        return ExitCode::from(2);
    };
    let adapter = CsvAdapter::new(path);
    let instrument = match resolve_instrument(adapter.instrument(), &config, None, None) {
        Ok(i) => i,
        Err(e) => return fail(&e),
    };
    let adapter = adapter.with_instrument(instrument.clone());
    let range = match parse_range(from, to) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    let report_port: Box<dyn ReportPort> = match format {
        ReportFormat::Text => Box::new(TextReportAdapter::from_config(&config)),
        ReportFormat::Csv => Box::new(CsvReportAdapter),
    };
    match run_scan_pipeline(
        &adapter,
        &instrument,
        strategy.as_ref(),
        &levels,
        range,
        report_port.as_ref(),
        output,
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn run_indicators(data: Option<&Path>, config_path: Option<&Path>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let prediction_config = match build_prediction_config(&config) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let Some(path) = resolve_data_path(data, &config) else {
        eprintln!("error: no data file (use --data or set [data] path)");
        return ExitCode::from(2);
    };

    let adapter = CsvAdapter::new(path);
    let (count, forecast) = match forecast_from_port(&adapter, &prediction_config, None, None) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    let snap = forecast.snapshot;
    println!("candles: {}", count);
    println!("close: {}", forecast.last_close);
    println!("{}: {:.4}", IndicatorType::Rsi(prediction_config.rsi_period), snap.rsi);
    println!("{}: {:.6}", IndicatorType::Ema(prediction_config.ema_fast_period), snap.ema_fast);
    println!("{}: {:.6}", IndicatorType::Ema(prediction_config.ema_slow_period), snap.ema_slow);
    println!("{}: {:.6}", IndicatorType::Atr(prediction_config.atr_period), snap.atr);
    println!("uptrend: {}", forecast.state.uptrend);
    println!("oversold: {}", forecast.state.oversold);
    println!("overbought: {}", forecast.state.overbought);
    ExitCode::SUCCESS
}

/// One-line summary of a data source. An empty source is `EmptyData`, as it
/// is for `predict`.
pub fn describe_source(data_port: &dyn DataPort) -> Result<String, CandlecastError> {
    let series = data_port.fetch_candles(None, None)?;
    let instrument = data_port.instrument();
    let (first, last) = series.range().ok_or_else(|| CandlecastError::EmptyData {
        source_name: instrument.symbol_label().to_string(),
    })?;

    Ok(format!(
        "{} ({}): {} candles, {} to {}",
        instrument.symbol_label(),
        instrument.timeframe_label(),
        series.len(),
        first,
        last
    ))
}

fn run_info(data: &Path) -> ExitCode {
    let adapter = CsvAdapter::new(data.to_path_buf());
    match describe_source(&adapter) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(Some(config_path)) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let prediction = match build_prediction_config(&config) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let risk = match build_risk_settings(&config, None, None) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    if let Err(e) = resolve_instrument(InstrumentInfo::default(), &config, None, None) {
        return fail(&e);
    }
    for kind in [StrategyKind::RsiEma, StrategyKind::MaCrossover] {
        if let Err(e) = build_strategy(kind, &config) {
            return fail(&e);
        }
    }

    eprintln!("\nPrediction:");
    eprintln!(
        "  indicators: {}, {}, {}, {}",
        IndicatorType::Rsi(prediction.rsi_period),
        IndicatorType::Ema(prediction.ema_fast_period),
        IndicatorType::Ema(prediction.ema_slow_period),
        IndicatorType::Atr(prediction.atr_period)
    );
    eprintln!(
        "  RSI bands:  oversold < {}, overbought > {}",
        prediction.oversold, prediction.overbought
    );
    eprintln!(
        "  horizons:   {} x {}h",
        prediction.horizons, prediction.horizon_hours
    );

    eprintln!("\nRisk:");
    match risk.account_balance {
        Some(balance) => eprintln!("  balance {}, risk {}%", balance, risk.risk_pct),
        None => eprintln!("  no account balance, sizing disabled"),
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

//! Forward signal generation from the latest indicator readings.
//!
//! Indicators are evaluated once per call. The resulting classification is
//! shared by every forecast horizon in the batch; horizons differ only in
//! their timestamp.

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};

use crate::domain::indicator::{
    calculate_atr, calculate_ema, calculate_rsi, DEFAULT_ATR_PERIOD, DEFAULT_RSI_PERIOD,
};
use crate::domain::error::CandlecastError;
use crate::domain::ohlcv::CandleSeries;
use crate::domain::signal::{Direction, Signal};

/// Static confirmation notes attached to every signal. Display only.
pub const RATIONALE: [&str; 3] = ["price trend analysis", "technical indicators", "price patterns"];

/// Tunable parameters of the prediction heuristic.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionConfig {
    pub rsi_period: usize,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub atr_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub atr_multiplier: f64,
    pub stop_pct: f64,
    pub target_step_pct: f64,
    pub horizons: u32,
    pub horizon_hours: i64,
    pub signal_confidence: f64,
    pub neutral_confidence: f64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            ema_fast_period: 50,
            ema_slow_period: 200,
            atr_period: DEFAULT_ATR_PERIOD,
            oversold: 30.0,
            overbought: 70.0,
            atr_multiplier: 1.5,
            stop_pct: 0.01,
            target_step_pct: 0.01,
            horizons: 3,
            horizon_hours: 4,
            signal_confidence: 0.7,
            neutral_confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub atr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketState {
    pub uptrend: bool,
    pub oversold: bool,
    pub overbought: bool,
}

/// Everything the engine derived from one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub last_close: f64,
    pub snapshot: IndicatorSnapshot,
    pub state: MarketState,
    pub signals: Vec<Signal>,
}

/// Signals for the default parameters. Empty for an empty series, and for
/// the degenerate cases [`generate_predictions_with`] rejects.
pub fn generate_predictions(series: &CandleSeries) -> Vec<Signal> {
    generate_predictions_with(series, &PredictionConfig::default()).unwrap_or_default()
}

pub fn generate_predictions_with(
    series: &CandleSeries,
    config: &PredictionConfig,
) -> Result<Vec<Signal>, CandlecastError> {
    if series.is_empty() {
        return Ok(Vec::new());
    }
    analyze(series, config).map(|forecast| forecast.signals)
}

/// Run the full heuristic.
///
/// A forecast whose entry price is not strictly positive carries no signals:
/// stops and targets scaled from it would no longer sit on the trade's side
/// of the entry.
pub fn analyze(series: &CandleSeries, config: &PredictionConfig) -> Result<Forecast, CandlecastError> {
    let last = series.last().ok_or_else(|| CandlecastError::EmptyData {
        source_name: "candle series".to_string(),
    })?;
    let candles = series.candles();

    let snapshot = IndicatorSnapshot {
        rsi: calculate_rsi(candles, config.rsi_period),
        ema_fast: calculate_ema(candles, config.ema_fast_period),
        ema_slow: calculate_ema(candles, config.ema_slow_period),
        atr: calculate_atr(candles, config.atr_period),
    };
    let state = MarketState {
        uptrend: last.close > snapshot.ema_fast && snapshot.ema_fast > snapshot.ema_slow,
        oversold: snapshot.rsi < config.oversold,
        overbought: snapshot.rsi > config.overbought,
    };
    debug!(?snapshot, ?state, "classified market");

    let offset = config.atr_multiplier * snapshot.atr;
    let (direction, entry_price, confidence) = if state.uptrend && state.oversold {
        (Direction::Buy, last.close + offset, config.signal_confidence)
    } else if !state.uptrend && state.overbought {
        (Direction::Sell, last.close - offset, config.signal_confidence)
    } else {
        (Direction::Buy, last.close, config.neutral_confidence)
    };

    let signals = if is_tradable_price(entry_price) {
        let (stop_loss, targets) = risk_levels(direction, entry_price, config);
        let rationale: Vec<String> = RATIONALE.iter().map(|s| s.to_string()).collect();

        (1..=config.horizons)
            .map(|horizon| {
                Ok(Signal {
                    timestamp: horizon_timestamp(last.timestamp, config.horizon_hours, horizon)?,
                    horizon,
                    direction,
                    entry_price,
                    stop_loss,
                    targets,
                    rationale: rationale.clone(),
                    confidence,
                })
            })
            .collect::<Result<Vec<_>, CandlecastError>>()?
    } else {
        warn!(entry_price, %direction, "entry price is not positive, no signals emitted");
        Vec::new()
    };

    Ok(Forecast {
        last_close: last.close,
        snapshot,
        state,
        signals,
    })
}

pub(crate) fn is_tradable_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn horizon_timestamp(
    last: NaiveDateTime,
    horizon_hours: i64,
    horizon: u32,
) -> Result<NaiveDateTime, CandlecastError> {
    let overflow = || CandlecastError::HorizonOverflow {
        last,
        hours: horizon_hours.saturating_mul(i64::from(horizon)),
    };
    let hours = horizon_hours
        .checked_mul(i64::from(horizon))
        .ok_or_else(overflow)?;
    let step = Duration::try_hours(hours).ok_or_else(overflow)?;
    last.checked_add_signed(step).ok_or_else(overflow)
}

/// Stop-loss and the three profit targets on the trade's side of the entry.
pub(crate) fn risk_levels(direction: Direction, entry: f64, config: &PredictionConfig) -> (f64, [f64; 3]) {
    let step = config.target_step_pct;
    match direction {
        Direction::Buy => (
            entry * (1.0 - config.stop_pct),
            [
                entry * (1.0 + step),
                entry * (1.0 + 2.0 * step),
                entry * (1.0 + 3.0 * step),
            ],
        ),
        Direction::Sell => (
            entry * (1.0 + config.stop_pct),
            [
                entry * (1.0 - step),
                entry * (1.0 - 2.0 * step),
                entry * (1.0 - 3.0 * step),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::Candle;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 19)
            .unwrap()
            .and_hms_opt(15, 15, 0)
            .unwrap()
    }

    fn series_from_closes(closes: &[f64]) -> CandleSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: start() + Duration::minutes(15 * i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 100.0,
            })
            .collect();
        CandleSeries::new(candles).unwrap()
    }

    #[test]
    fn empty_series_yields_no_signals() {
        let series = CandleSeries::default();
        assert!(generate_predictions(&series).is_empty());
        assert!(matches!(
            analyze(&series, &PredictionConfig::default()),
            Err(CandlecastError::EmptyData { .. })
        ));
        assert!(generate_predictions_with(&series, &PredictionConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn single_candle_fallback_branch() {
        let candle = Candle::new(start(), 4.4384, 4.4857, 4.4384, 4.4713, 105825.35994).unwrap();
        let series = CandleSeries::new(vec![candle]).unwrap();

        let forecast = analyze(&series, &PredictionConfig::default()).unwrap();
        assert_eq!(forecast.snapshot.atr, 0.0);
        assert_eq!(forecast.snapshot.ema_fast, 4.4713);
        assert_eq!(forecast.snapshot.ema_slow, 4.4713);
        assert_eq!(forecast.snapshot.rsi, 50.0);
        assert!(!forecast.state.uptrend);
        assert!(!forecast.state.oversold);
        assert!(!forecast.state.overbought);

        let signals = forecast.signals;
        assert_eq!(signals.len(), 3);
        for signal in &signals {
            assert_eq!(signal.direction, Direction::Buy);
            assert_eq!(signal.entry_price, 4.4713);
            assert_eq!(signal.confidence, 0.5);
            assert_relative_eq!(signal.stop_loss, 4.426587, epsilon = 1e-9);
            assert_relative_eq!(signal.targets[0], 4.516013, epsilon = 1e-9);
            assert_relative_eq!(signal.targets[1], 4.560726, epsilon = 1e-9);
            assert_relative_eq!(signal.targets[2], 4.605439, epsilon = 1e-9);
        }
    }

    #[test]
    fn timestamps_step_by_horizon_hours() {
        let series = series_from_closes(&[10.0, 10.5, 11.0]);
        let signals = generate_predictions(&series);
        let last = series.last().unwrap().timestamp;

        let horizons: Vec<u32> = signals.iter().map(|s| s.horizon).collect();
        assert_eq!(horizons, vec![1, 2, 3]);
        for (i, signal) in signals.iter().enumerate() {
            assert_eq!(signal.timestamp, last + Duration::hours(4 * (i as i64 + 1)));
        }
    }

    #[test]
    fn overbought_without_uptrend_sells() {
        // Steady rise: RSI saturates at 100, and with fewer than 50 candles
        // both EMAs fall back to the last close, so there is no uptrend.
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes(&closes);
        let forecast = analyze(&series, &PredictionConfig::default()).unwrap();

        assert!(forecast.state.overbought);
        assert!(!forecast.state.uptrend);

        let signal = &forecast.signals[0];
        assert_eq!(signal.direction, Direction::Sell);
        assert_eq!(signal.confidence, 0.7);
        assert_relative_eq!(
            signal.entry_price,
            forecast.last_close - 1.5 * forecast.snapshot.atr
        );
        assert!(signal.targets[2] < signal.targets[1]);
        assert!(signal.targets[1] < signal.targets[0]);
        assert!(signal.targets[0] < signal.entry_price);
        assert!(signal.entry_price < signal.stop_loss);
    }

    #[test]
    fn oversold_in_uptrend_buys_above_close() {
        // Short periods make the uptrend reachable with a small series: a
        // long rally lifts the fast EMA over the slow one, then a sharp but
        // shallow pullback drives RSI(3) to zero while close stays above
        // both averages.
        let mut closes: Vec<f64> = (0..40).map(|i| 100.0 + 2.0 * i as f64).collect();
        closes.extend([177.5, 177.0, 176.5]);
        let series = series_from_closes(&closes);
        let config = PredictionConfig {
            rsi_period: 3,
            ema_fast_period: 5,
            ema_slow_period: 20,
            ..PredictionConfig::default()
        };
        let forecast = analyze(&series, &config).unwrap();

        assert!(forecast.state.uptrend, "{:?}", forecast.snapshot);
        assert!(forecast.state.oversold, "{:?}", forecast.snapshot);

        let signal = &forecast.signals[0];
        assert_eq!(signal.direction, Direction::Buy);
        assert_eq!(signal.confidence, 0.7);
        assert_relative_eq!(
            signal.entry_price,
            forecast.last_close + 1.5 * forecast.snapshot.atr
        );
    }

    #[test]
    fn custom_horizon_count_and_spacing() {
        let series = series_from_closes(&[10.0, 10.5]);
        let config = PredictionConfig {
            horizons: 5,
            horizon_hours: 1,
            ..PredictionConfig::default()
        };
        let signals = generate_predictions_with(&series, &config).unwrap();
        assert_eq!(signals.len(), 5);
        assert_eq!(
            signals[4].timestamp,
            series.last().unwrap().timestamp + Duration::hours(5)
        );
    }

    #[test]
    fn signals_share_classification() {
        let series = series_from_closes(&[10.0, 9.0, 11.0, 10.5]);
        let signals = generate_predictions(&series);
        for signal in &signals[1..] {
            assert_eq!(signal.direction, signals[0].direction);
            assert_eq!(signal.entry_price, signals[0].entry_price);
            assert_eq!(signal.targets, signals[0].targets);
            assert_eq!(signal.rationale, signals[0].rationale);
        }
    }

    #[test]
    fn rationale_is_static() {
        let series = series_from_closes(&[10.0]);
        let signals = generate_predictions(&series);
        assert_eq!(
            signals[0].rationale,
            vec!["price trend analysis", "technical indicators", "price patterns"]
        );
    }

    #[test]
    fn crash_below_atr_offset_emits_no_signals() {
        // One large candle followed by a slow grind: RSI saturates, the
        // full-history ATR dwarfs the last close, and close - 1.5 * ATR < 0.
        let mut closes = vec![100.0];
        closes.extend((0..20).map(|i| 1.0 + 0.1 * i as f64));
        let series = series_from_closes(&closes);

        let forecast = analyze(&series, &PredictionConfig::default()).unwrap();
        assert!(forecast.state.overbought);
        assert!(forecast.last_close - 1.5 * forecast.snapshot.atr < 0.0);
        assert!(forecast.signals.is_empty());
        assert!(generate_predictions(&series).is_empty());
    }

    #[test]
    fn zero_price_candle_emits_no_signals() {
        let candle = Candle::new(start(), 0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        let series = CandleSeries::new(vec![candle]).unwrap();

        let forecast = analyze(&series, &PredictionConfig::default()).unwrap();
        assert_eq!(forecast.last_close, 0.0);
        assert!(forecast.signals.is_empty());
    }

    #[test]
    fn horizon_past_calendar_range_is_an_error() {
        let series = series_from_closes(&[10.0, 10.5]);
        let config = PredictionConfig {
            horizon_hours: 2_000_000_000,
            ..PredictionConfig::default()
        };
        let err = analyze(&series, &config).unwrap_err();
        assert!(matches!(err, CandlecastError::HorizonOverflow { .. }));
        assert!(generate_predictions_with(&series, &config).is_err());
    }
}

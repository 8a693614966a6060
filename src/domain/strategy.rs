//! Historical signal scanners.
//!
//! A scanner walks the whole series and emits one [`Signal`] on every bar
//! where its trigger fires. Triggers compare the bar with the one before
//! it, and a bar is only eligible once every indicator the scanner uses had
//! a full window on the previous bar. Entry is the trigger bar's close;
//! stop and targets come from the same percentage levels as forecasts.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::domain::indicator::{ema_series, rsi_series, DEFAULT_RSI_PERIOD};
use crate::domain::ohlcv::CandleSeries;
use crate::domain::prediction::{is_tradable_price, risk_levels, PredictionConfig};
use crate::domain::signal::{Direction, Signal};

/// RSI level splitting bullish from bearish momentum.
const RSI_MIDLINE: f64 = 50.0;

pub trait Strategy {
    fn name(&self) -> &'static str;

    /// Every historical trigger, oldest first. Levels and confidence come
    /// from `levels`; `horizon` is 0 on scanned signals.
    fn scan(&self, series: &CandleSeries, levels: &PredictionConfig) -> Vec<Signal>;
}

/// Buy when RSI climbs back through `rsi_buy` above the EMA; sell when RSI
/// falls back through `rsi_sell` below it.
#[derive(Debug, Clone, PartialEq)]
pub struct RsiEmaStrategy {
    pub rsi_period: usize,
    pub ema_period: usize,
    pub rsi_buy: f64,
    pub rsi_sell: f64,
}

impl Default for RsiEmaStrategy {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            ema_period: 50,
            rsi_buy: 40.0,
            rsi_sell: 70.0,
        }
    }
}

/// Buy on a short-over-long EMA cross with RSI above 50; sell on the
/// opposite cross with RSI below 50.
#[derive(Debug, Clone, PartialEq)]
pub struct MaCrossoverStrategy {
    pub short_period: usize,
    pub long_period: usize,
    pub rsi_period: usize,
}

impl Default for MaCrossoverStrategy {
    fn default() -> Self {
        Self {
            short_period: 9,
            long_period: 21,
            rsi_period: DEFAULT_RSI_PERIOD,
        }
    }
}

struct Trigger {
    index: usize,
    direction: Direction,
    rationale: Vec<String>,
}

fn to_signals(series: &CandleSeries, triggers: Vec<Trigger>, levels: &PredictionConfig) -> Vec<Signal> {
    let candles = series.candles();
    triggers
        .into_iter()
        .filter_map(|trigger| {
            let bar = &candles[trigger.index];
            if !is_tradable_price(bar.close) {
                return None;
            }
            let (stop_loss, targets) = risk_levels(trigger.direction, bar.close, levels);
            Some(Signal {
                timestamp: bar.timestamp,
                horizon: 0,
                direction: trigger.direction,
                entry_price: bar.close,
                stop_loss,
                targets,
                rationale: trigger.rationale,
                confidence: levels.signal_confidence,
            })
        })
        .collect()
}

impl Strategy for RsiEmaStrategy {
    fn name(&self) -> &'static str {
        "rsi_ema"
    }

    fn scan(&self, series: &CandleSeries, levels: &PredictionConfig) -> Vec<Signal> {
        let candles = series.candles();
        let rsi = rsi_series(candles, self.rsi_period);
        let ema = ema_series(candles, self.ema_period);
        let warmup = self.rsi_period.max(self.ema_period).max(1);

        let mut triggers = Vec::new();
        for i in warmup..candles.len() {
            let close = candles[i].close;
            if rsi[i - 1] < self.rsi_buy && rsi[i] >= self.rsi_buy && close > ema[i] {
                triggers.push(Trigger {
                    index: i,
                    direction: Direction::Buy,
                    rationale: vec![
                        format!("RSI({}) crossed above {}", self.rsi_period, self.rsi_buy),
                        format!("close above EMA({})", self.ema_period),
                    ],
                });
            } else if rsi[i - 1] > self.rsi_sell && rsi[i] <= self.rsi_sell && close < ema[i] {
                triggers.push(Trigger {
                    index: i,
                    direction: Direction::Sell,
                    rationale: vec![
                        format!("RSI({}) fell back below {}", self.rsi_period, self.rsi_sell),
                        format!("close below EMA({})", self.ema_period),
                    ],
                });
            }
        }
        debug!(strategy = self.name(), triggers = triggers.len(), "scan complete");
        to_signals(series, triggers, levels)
    }
}

impl Strategy for MaCrossoverStrategy {
    fn name(&self) -> &'static str {
        "ma_crossover"
    }

    fn scan(&self, series: &CandleSeries, levels: &PredictionConfig) -> Vec<Signal> {
        let candles = series.candles();
        let short = ema_series(candles, self.short_period);
        let long = ema_series(candles, self.long_period);
        let rsi = rsi_series(candles, self.rsi_period);
        let warmup = self
            .short_period
            .max(self.long_period)
            .max(self.rsi_period)
            .max(1);

        let mut triggers = Vec::new();
        for i in warmup..candles.len() {
            let crossed_up = short[i - 1] <= long[i - 1] && short[i] > long[i];
            let crossed_down = short[i - 1] >= long[i - 1] && short[i] < long[i];

            if crossed_up && rsi[i] > RSI_MIDLINE {
                triggers.push(Trigger {
                    index: i,
                    direction: Direction::Buy,
                    rationale: vec![
                        format!("EMA({}) crossed above EMA({})", self.short_period, self.long_period),
                        format!("RSI({}) above {}", self.rsi_period, RSI_MIDLINE),
                    ],
                });
            } else if crossed_down && rsi[i] < RSI_MIDLINE {
                triggers.push(Trigger {
                    index: i,
                    direction: Direction::Sell,
                    rationale: vec![
                        format!("EMA({}) crossed below EMA({})", self.short_period, self.long_period),
                        format!("RSI({}) below {}", self.rsi_period, RSI_MIDLINE),
                    ],
                });
            }
        }
        debug!(strategy = self.name(), triggers = triggers.len(), "scan complete");
        to_signals(series, triggers, levels)
    }
}

/// Scanner selector used by configuration and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    RsiEma,
    MaCrossover,
}

impl StrategyKind {
    /// INI section holding this scanner's parameters.
    pub fn section(&self) -> &'static str {
        match self {
            StrategyKind::RsiEma => "rsi_ema",
            StrategyKind::MaCrossover => "ma_crossover",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rsi_ema" => Ok(StrategyKind::RsiEma),
            "ma_crossover" => Ok(StrategyKind::MaCrossover),
            _ => Err(format!(
                "unknown strategy '{}' (expected rsi_ema or ma_crossover)",
                s
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

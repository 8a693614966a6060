//! Configuration validation.
//!
//! Validates every `[prediction]`, `[risk]` and scanner key before it is used.
//! Missing keys fall back to their defaults and are always valid.

use crate::domain::error::CandlecastError;
use crate::domain::prediction::PredictionConfig;
use crate::domain::risk::DEFAULT_RISK_PCT;
use crate::domain::strategy::{MaCrossoverStrategy, RsiEmaStrategy, StrategyKind};
use crate::ports::config_port::ConfigPort;

/// Upper bound on `[prediction] horizons`.
pub const MAX_HORIZONS: i64 = 1000;
/// Upper bound on `[prediction] horizon_hours`: one leap year.
pub const MAX_HORIZON_HOURS: i64 = 8784;

pub fn validate_prediction_config(config: &dyn ConfigPort) -> Result<(), CandlecastError> {
    let defaults = PredictionConfig::default();
    validate_periods(config, &defaults)?;
    validate_thresholds(config, &defaults)?;
    validate_levels(config, &defaults)?;
    validate_horizons(config, &defaults)?;
    validate_confidences(config, &defaults)?;
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), CandlecastError> {
    if config.get_string("risk", "account_balance").is_some() {
        validate_account_balance(config.get_double("risk", "account_balance", f64::NAN))?;
    }
    validate_risk_pct(config.get_double("risk", "risk_pct", DEFAULT_RISK_PCT))
}

/// A finite, strictly positive balance.
pub fn validate_account_balance(balance: f64) -> Result<(), CandlecastError> {
    if balance.is_finite() && balance > 0.0 {
        Ok(())
    } else {
        Err(invalid(
            "risk",
            "account_balance",
            "account_balance must be a positive number",
        ))
    }
}

/// A percentage in `(0, 100]`.
pub fn validate_risk_pct(risk_pct: f64) -> Result<(), CandlecastError> {
    if risk_pct > 0.0 && risk_pct <= 100.0 {
        Ok(())
    } else {
        Err(invalid("risk", "risk_pct", "risk_pct must be in (0, 100]"))
    }
}

/// Validates the parameter section of one scanner (`[rsi_ema]` or
/// `[ma_crossover]`).
pub fn validate_strategy_config(
    config: &dyn ConfigPort,
    kind: StrategyKind,
) -> Result<(), CandlecastError> {
    let section = kind.section();
    let positive = |key: &str, default: usize| {
        if config.get_int(section, key, default as i64) <= 0 {
            Err(invalid(section, key, &format!("{key} must be a positive integer")))
        } else {
            Ok(())
        }
    };

    match kind {
        StrategyKind::RsiEma => {
            let d = RsiEmaStrategy::default();
            positive("rsi_period", d.rsi_period)?;
            positive("ema_period", d.ema_period)?;
            for (key, default) in [("rsi_buy", d.rsi_buy), ("rsi_sell", d.rsi_sell)] {
                if !(0.0..=100.0).contains(&config.get_double(section, key, default)) {
                    return Err(invalid(section, key, &format!("{key} must be between 0 and 100")));
                }
            }
        }
        StrategyKind::MaCrossover => {
            let d = MaCrossoverStrategy::default();
            positive("short_period", d.short_period)?;
            positive("long_period", d.long_period)?;
            positive("rsi_period", d.rsi_period)?;
            let short = config.get_int(section, "short_period", d.short_period as i64);
            let long = config.get_int(section, "long_period", d.long_period as i64);
            if short >= long {
                return Err(invalid(
                    section,
                    "short_period",
                    "short_period must be shorter than long_period",
                ));
            }
        }
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> CandlecastError {
    CandlecastError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_periods(
    config: &dyn ConfigPort,
    defaults: &PredictionConfig,
) -> Result<(), CandlecastError> {
    let periods = [
        ("rsi_period", defaults.rsi_period),
        ("ema_fast_period", defaults.ema_fast_period),
        ("ema_slow_period", defaults.ema_slow_period),
        ("atr_period", defaults.atr_period),
    ];
    for (key, default) in periods {
        if config.get_int("prediction", key, default as i64) <= 0 {
            return Err(invalid(
                "prediction",
                key,
                &format!("{key} must be a positive integer"),
            ));
        }
    }

    let fast = config.get_int("prediction", "ema_fast_period", defaults.ema_fast_period as i64);
    let slow = config.get_int("prediction", "ema_slow_period", defaults.ema_slow_period as i64);
    if fast >= slow {
        return Err(invalid(
            "prediction",
            "ema_fast_period",
            "ema_fast_period must be shorter than ema_slow_period",
        ));
    }
    Ok(())
}

fn validate_thresholds(
    config: &dyn ConfigPort,
    defaults: &PredictionConfig,
) -> Result<(), CandlecastError> {
    let oversold = config.get_double("prediction", "oversold", defaults.oversold);
    let overbought = config.get_double("prediction", "overbought", defaults.overbought);

    if !(0.0..=100.0).contains(&oversold) {
        return Err(invalid(
            "prediction",
            "oversold",
            "oversold must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "prediction",
            "overbought",
            "overbought must be between 0 and 100",
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "prediction",
            "oversold",
            "oversold must be below overbought",
        ));
    }
    Ok(())
}

fn validate_levels(
    config: &dyn ConfigPort,
    defaults: &PredictionConfig,
) -> Result<(), CandlecastError> {
    let multiplier = config.get_double("prediction", "atr_multiplier", defaults.atr_multiplier);
    if !(multiplier.is_finite() && multiplier >= 0.0) {
        return Err(invalid(
            "prediction",
            "atr_multiplier",
            "atr_multiplier must be non-negative",
        ));
    }

    for (key, default) in [
        ("stop_pct", defaults.stop_pct),
        ("target_step_pct", defaults.target_step_pct),
    ] {
        let value = config.get_double("prediction", key, default);
        if !(value > 0.0 && value < 1.0) {
            return Err(invalid(
                "prediction",
                key,
                &format!("{key} must be a fraction between 0 and 1"),
            ));
        }
    }

    // The furthest sell target must stay above zero.
    let step = config.get_double("prediction", "target_step_pct", defaults.target_step_pct);
    if 3.0 * step >= 1.0 {
        return Err(invalid(
            "prediction",
            "target_step_pct",
            "target_step_pct must be below 1/3",
        ));
    }
    Ok(())
}

fn validate_horizons(
    config: &dyn ConfigPort,
    defaults: &PredictionConfig,
) -> Result<(), CandlecastError> {
    let horizons = config.get_int("prediction", "horizons", i64::from(defaults.horizons));
    if !(1..=MAX_HORIZONS).contains(&horizons) {
        return Err(invalid(
            "prediction",
            "horizons",
            &format!("horizons must be between 1 and {MAX_HORIZONS}"),
        ));
    }
    let hours = config.get_int("prediction", "horizon_hours", defaults.horizon_hours);
    if !(1..=MAX_HORIZON_HOURS).contains(&hours) {
        return Err(invalid(
            "prediction",
            "horizon_hours",
            &format!("horizon_hours must be between 1 and {MAX_HORIZON_HOURS}"),
        ));
    }
    Ok(())
}

fn validate_confidences(
    config: &dyn ConfigPort,
    defaults: &PredictionConfig,
) -> Result<(), CandlecastError> {
    for (key, default) in [
        ("signal_confidence", defaults.signal_confidence),
        ("neutral_confidence", defaults.neutral_confidence),
    ] {
        let value = config.get_double("prediction", key, default);
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(
                "prediction",
                key,
                &format!("{key} must be between 0 and 1"),
            ));
        }
    }
    Ok(())
}

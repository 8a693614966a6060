//! Position sizing for a produced signal.

use crate::domain::signal::Signal;

/// Units to trade so that hitting the stop loses `risk_pct` percent of the
/// account.
///
/// Returns 0 when entry and stop coincide.
pub fn position_size(account_balance: f64, risk_pct: f64, entry_price: f64, stop_loss: f64) -> f64 {
    let risk_amount = account_balance * (risk_pct / 100.0);
    let stop_distance = (entry_price - stop_loss).abs();
    if stop_distance > 0.0 {
        risk_amount / stop_distance
    } else {
        0.0
    }
}

pub const DEFAULT_RISK_PCT: f64 = 1.0;

/// Account parameters for sizing. Sizing is skipped without a balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSettings {
    pub account_balance: Option<f64>,
    pub risk_pct: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            account_balance: None,
            risk_pct: DEFAULT_RISK_PCT,
        }
    }
}

impl RiskSettings {
    pub fn plan(&self, signal: &Signal) -> Option<PositionPlan> {
        self.account_balance
            .map(|balance| PositionPlan::for_signal(signal, balance, self.risk_pct))
    }
}

/// Sizing of one signal against an account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionPlan {
    pub units: f64,
    /// Cash lost if the stop is hit.
    pub risk_amount: f64,
    /// Cash gained at each target.
    pub target_profits: [f64; 3],
}

impl PositionPlan {
    pub fn for_signal(signal: &Signal, account_balance: f64, risk_pct: f64) -> Self {
        let units = position_size(account_balance, risk_pct, signal.entry_price, signal.stop_loss);
        Self {
            units,
            risk_amount: units * signal.risk(),
            target_profits: signal.rewards().map(|reward| units * reward),
        }
    }
}

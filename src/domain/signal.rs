//! Forecast signal produced by the prediction engine.

use std::fmt;

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => f.write_str("BUY"),
            Direction::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal {
    pub timestamp: NaiveDateTime,
    /// 1-based forecast step.
    pub horizon: u32,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    /// Ordered by increasing distance from the entry price.
    pub targets: [f64; 3],
    pub rationale: Vec<String>,
    pub confidence: f64,
}

impl Signal {
    /// Distance between entry and stop.
    pub fn risk(&self) -> f64 {
        (self.entry_price - self.stop_loss).abs()
    }

    /// Distance between entry and the given target, `None` past the third.
    pub fn reward(&self, target: usize) -> Option<f64> {
        self.targets
            .get(target)
            .map(|price| (price - self.entry_price).abs())
    }

    /// Reward per unit of risk for the given target; 0 when the stop sits on
    /// the entry.
    pub fn risk_reward(&self, target: usize) -> Option<f64> {
        let reward = self.reward(target)?;
        let risk = self.risk();
        Some(if risk == 0.0 { 0.0 } else { reward / risk })
    }

    /// Distances to all three targets.
    pub fn rewards(&self) -> [f64; 3] {
        self.targets.map(|price| (price - self.entry_price).abs())
    }

    /// Reward-to-risk ratio of all three targets.
    pub fn risk_rewards(&self) -> [f64; 3] {
        let risk = self.risk();
        self.rewards()
            .map(|reward| if risk == 0.0 { 0.0 } else { reward / risk })
    }

    /// Wall-clock time of the forecast, `HH:MM`.
    pub fn display_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

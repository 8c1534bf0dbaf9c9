//! Market State Classifier
//!
//! Derives a coarse picture of the recent outcome stream from the last 15
//! rounds:
//!
//! - **Trend**: which side dominates the window (Tai = up, Xiu = down)
//! - **Momentum**: recency-weighted balance in [-1, 1]
//! - **Stability**: 1 - share of adjacent pairs that changed side
//! - **Regime**: trending / volatile / random / normal
//!
//! Regime rules, evaluated in order:
//! - change rate > 0.65 → Volatile
//! - |balance| >= 0.4 and change rate < 0.4 → Trending
//! - |balance| < 0.2 → Random
//! - otherwise → Normal

use serde::{Deserialize, Serialize};
use std::fmt;

use super::history::{alternations, side_counts};
use super::outcome::Outcome;

/// Outcomes needed (and used) for classification
pub const MARKET_WINDOW: usize = 15;

const VOLATILE_CHANGE_RATE: f64 = 0.65;
const TRENDING_BALANCE: f64 = 0.4;
const TRENDING_CHANGE_RATE: f64 = 0.4;
const RANDOM_BALANCE: f64 = 0.2;
const TREND_BALANCE: f64 = 0.2;

/// Direction of the recent stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Tai dominates
    Up,
    /// Xiu dominates
    Down,
    Neutral,
}

/// Coarse classification of recent behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Trending,
    Volatile,
    Random,
    Normal,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regime::Trending => write!(f, "trending"),
            Regime::Volatile => write!(f, "volatile"),
            Regime::Random => write!(f, "random"),
            Regime::Normal => write!(f, "normal"),
        }
    }
}

/// Derived market picture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    pub trend: Trend,
    pub momentum: f64,
    pub stability: f64,
    pub regime: Regime,
}

impl Default for MarketState {
    fn default() -> Self {
        Self {
            trend: Trend::Neutral,
            momentum: 0.0,
            stability: 0.5,
            regime: Regime::Normal,
        }
    }
}

impl MarketState {
    /// Classify the last 15 outcomes, or `None` when fewer are available
    pub fn classify(recent: &[Outcome]) -> Option<Self> {
        if recent.len() < MARKET_WINDOW {
            return None;
        }
        let window = &recent[recent.len() - MARKET_WINDOW..];

        let (tai, xiu) = side_counts(window);
        let balance = (tai as f64 - xiu as f64) / MARKET_WINDOW as f64;
        let change_rate = alternations(window) as f64 / (MARKET_WINDOW - 1) as f64;

        let trend = if balance > TREND_BALANCE {
            Trend::Up
        } else if balance < -TREND_BALANCE {
            Trend::Down
        } else {
            Trend::Neutral
        };

        let regime = if change_rate > VOLATILE_CHANGE_RATE {
            Regime::Volatile
        } else if balance.abs() >= TRENDING_BALANCE && change_rate < TRENDING_CHANGE_RATE {
            Regime::Trending
        } else if balance.abs() < RANDOM_BALANCE {
            Regime::Random
        } else {
            Regime::Normal
        };

        Some(Self {
            trend,
            momentum: weighted_momentum(window),
            stability: 1.0 - change_rate,
            regime,
        })
    }
}

/// Linearly recency-weighted balance: the newest outcome weighs `n`,
/// the oldest weighs 1.
fn weighted_momentum(window: &[Outcome]) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (i, outcome) in window.iter().enumerate() {
        let weight = (i + 1) as f64;
        let sign = match outcome {
            Outcome::Tai => 1.0,
            Outcome::Xiu => -1.0,
        };
        weighted += weight * sign;
        total_weight += weight;
    }
    if total_weight == 0.0 {
        0.0
    } else {
        (weighted / total_weight).clamp(-1.0, 1.0)
    }
}

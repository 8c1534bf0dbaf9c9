//! Trend Model (short/long blend)
//!
//! Measures direction and strength over a short (5) and a long (20) window.
//! Strength is the count imbalance discounted by how often the window
//! alternates, so a choppy window with a small majority reads as weak.
//!
//! Blending:
//! - both windows agree → average strength
//! - disagree → the window at least 1.5x stronger wins, else the long window

use crate::domain::{alternations, side_counts, Outcome, Regime};
use super::{regime_multiplier, ModelContext, ModelOpinion, MAX_CONFIDENCE};

pub const SHORT_WINDOW: usize = 5;
pub const LONG_WINDOW: usize = 20;

/// Minimum outcomes for the short window
pub const MIN_SHORT: usize = 3;

/// Minimum outcomes for the long window (and the model)
pub const MIN_LONG: usize = 10;

const DOMINANCE_RATIO: f64 = 1.5;
const DAMPENING: f64 = 0.9;
const REGIME_TABLE: [(Regime, f64); 2] = [(Regime::Trending, 1.15), (Regime::Volatile, 0.85)];

/// Direction and strength of one window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowTrend {
    /// Majority side, `None` on an even split
    pub direction: Option<Outcome>,
    /// Imbalance discounted by alternation rate, in [0, 1]
    pub strength: f64,
    /// Alternation rate of the window
    pub volatility: f64,
}

impl WindowTrend {
    pub fn analyze(window: &[Outcome]) -> Self {
        let n = window.len();
        if n == 0 {
            return Self {
                direction: None,
                strength: 0.0,
                volatility: 0.0,
            };
        }

        let (tai, xiu) = side_counts(window);
        let direction = match tai.cmp(&xiu) {
            std::cmp::Ordering::Greater => Some(Outcome::Tai),
            std::cmp::Ordering::Less => Some(Outcome::Xiu),
            std::cmp::Ordering::Equal => None,
        };
        let magnitude = tai.abs_diff(xiu) as f64 / n as f64;
        let volatility = if n > 1 {
            alternations(window) as f64 / (n - 1) as f64
        } else {
            0.0
        };

        Self {
            direction,
            strength: magnitude * (1.0 - volatility),
            volatility,
        }
    }
}

/// Pick direction and strength from the two windows
fn blend(short: WindowTrend, long: WindowTrend) -> (Option<Outcome>, f64, &'static str) {
    if short.direction.is_some() && short.direction == long.direction {
        return (long.direction, (short.strength + long.strength) / 2.0, "windows agree");
    }
    if short.strength >= long.strength * DOMINANCE_RATIO && short.strength > 0.0 {
        (short.direction, short.strength, "short window dominates")
    } else if long.strength >= short.strength * DOMINANCE_RATIO && long.strength > 0.0 {
        (long.direction, long.strength, "long window dominates")
    } else {
        (long.direction, long.strength, "windows disagree, long window preferred")
    }
}

pub fn evaluate(ctx: &ModelContext<'_>) -> ModelOpinion {
    if ctx.len() < MIN_LONG {
        return ModelOpinion::none(format!("needs {} outcomes, have {}", MIN_LONG, ctx.len()));
    }

    let short_window = ctx.recent(SHORT_WINDOW);
    if short_window.len() < MIN_SHORT {
        return ModelOpinion::none("short window incomplete");
    }
    let short = WindowTrend::analyze(short_window);
    let long = WindowTrend::analyze(ctx.recent(LONG_WINDOW));

    let (direction, strength, reason) = blend(short, long);
    let Some(direction) = direction else {
        return ModelOpinion::none(format!("no direction ({})", reason));
    };

    let multiplier = regime_multiplier(ctx.regime(), &REGIME_TABLE);
    let confidence = (strength * multiplier * DAMPENING).min(MAX_CONFIDENCE);

    ModelOpinion::new(
        direction,
        confidence,
        format!(
            "{} trend, {} (short {:.2}, long {:.2})",
            direction, reason, short.strength, long.strength
        ),
    )
}

//! Sub-models
//!
//! Each sub-model is a pure function of the ensemble's read-only state
//! returning a [`ModelOpinion`]: a predicted side with confidence and a
//! rationale, or no opinion when its preconditions are not met.
//!
//! Primitive models read only history-derived state. The weight balancer is
//! a meta model: it reads the primitive opinions and nothing else.

pub mod pattern_match;
pub mod trend;
pub mod mean_reversion;
pub mod momentum;
pub mod streak_break;
pub mod balancer;

use serde::{Deserialize, Serialize};

use crate::domain::{MarketState, Outcome, Regime, SessionStats};
use super::pattern_db::PatternDatabase;

/// Highest confidence any sub-model may report
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Output of one sub-model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOpinion {
    pub prediction: Option<Outcome>,
    pub confidence: f64,
    pub rationale: String,
}

impl ModelOpinion {
    /// An opinion for `prediction`; confidence is clamped to [0, 0.95]
    pub fn new(prediction: Outcome, confidence: f64, rationale: impl Into<String>) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, MAX_CONFIDENCE)
        } else {
            0.0
        };
        Self {
            prediction: Some(prediction),
            confidence,
            rationale: rationale.into(),
        }
    }

    /// No opinion
    pub fn none(rationale: impl Into<String>) -> Self {
        Self {
            prediction: None,
            confidence: 0.0,
            rationale: rationale.into(),
        }
    }

    pub fn has_prediction(&self) -> bool {
        self.prediction.is_some()
    }

    /// Same prediction with confidence multiplied (and re-clamped)
    pub fn scaled(&self, factor: f64, rationale: impl Into<String>) -> Self {
        match self.prediction {
            Some(p) => Self::new(p, self.confidence * factor, rationale),
            None => Self::none(rationale),
        }
    }
}

/// Read-only view of ensemble state handed to every primitive model
#[derive(Debug, Clone, Copy)]
pub struct ModelContext<'a> {
    /// Chronological history, oldest first
    pub history: &'a [Outcome],
    pub stats: &'a SessionStats,
    pub market: &'a MarketState,
    pub patterns: &'a PatternDatabase,
    /// Fixed streak-break probability, if configured
    pub break_probability: Option<f64>,
}

impl<'a> ModelContext<'a> {
    /// The last `n` outcomes (fewer if not available)
    pub fn recent(&self, n: usize) -> &'a [Outcome] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn regime(&self) -> Regime {
        self.market.regime
    }
}

/// Multiplier for a regime, 1.0 when the regime is not listed
pub(crate) fn regime_multiplier(regime: Regime, table: &[(Regime, f64)]) -> f64 {
    table
        .iter()
        .find(|(r, _)| *r == regime)
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}

//! Ensemble Parameters
//!
//! Tunables for the ensemble predictor. Defaults keep a 200-outcome history,
//! mine 3-8 symbol patterns with no eviction, clamp weights to [0.1, 2.0] and
//! break ties deterministically.

use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_MAX_HISTORY;

/// Allowed pattern length range (symbols, prediction included)
pub const MIN_PATTERN_LEN: usize = 3;
pub const MAX_PATTERN_LEN: usize = 8;

/// How equal (or absent) consensus mass is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Opposite of the last outcome (Tai on empty history)
    #[default]
    Reversal,
    /// Uniform random side
    Random,
}

/// Main ensemble configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Maximum outcomes kept in history
    pub max_history: usize,
    /// Shortest mined pattern (symbols, prediction included)
    pub min_pattern_len: usize,
    /// Longest mined pattern
    pub max_pattern_len: usize,
    /// Optional bound on pattern database size; enables eviction of
    /// least-recently-validated mined entries
    pub pattern_capacity: Option<usize>,
    /// Lower weight clamp
    pub min_weight: f64,
    /// Upper weight clamp
    pub max_weight: f64,
    /// Relative accuracy spread above which weights are recomputed
    pub spread_threshold: f64,
    /// Fixed streak-break probability; estimated from history when unset
    pub break_probability: Option<f64>,
    /// Consensus tie-break policy
    pub tie_break: TieBreak,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            min_pattern_len: MIN_PATTERN_LEN,
            max_pattern_len: MAX_PATTERN_LEN,
            pattern_capacity: None,
            min_weight: 0.1,
            max_weight: 2.0,
            spread_threshold: 0.3,
            break_probability: None,
            tie_break: TieBreak::Reversal,
        }
    }
}

impl EnsembleConfig {
    /// Fix the streak-break probability instead of estimating it
    pub fn with_break_probability(mut self, probability: f64) -> Self {
        self.break_probability = Some(probability);
        self
    }

    /// Bound the pattern database
    pub fn with_pattern_capacity(mut self, capacity: usize) -> Self {
        self.pattern_capacity = Some(capacity);
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ParamsError> {
        // The long trend window needs 20 outcomes
        if self.max_history < 20 {
            return Err(ParamsError::InvalidHistory(self.max_history));
        }
        if self.min_pattern_len < MIN_PATTERN_LEN
            || self.max_pattern_len > MAX_PATTERN_LEN
            || self.min_pattern_len > self.max_pattern_len
        {
            return Err(ParamsError::InvalidPatternLength(self.min_pattern_len, self.max_pattern_len));
        }
        if let Some(capacity) = self.pattern_capacity {
            if capacity < super::pattern_db::SEED_COUNT {
                return Err(ParamsError::InvalidPatternCapacity(capacity));
            }
        }
        // NaN passes every range comparison below
        if !self.min_weight.is_finite()
            || !self.max_weight.is_finite()
            || self.min_weight <= 0.0
            || self.min_weight > 1.0
            || self.max_weight < 1.0
        {
            return Err(ParamsError::InvalidWeightBounds(self.min_weight, self.max_weight));
        }
        if !self.spread_threshold.is_finite()
            || self.spread_threshold <= 0.0
            || self.spread_threshold > 1.0
        {
            return Err(ParamsError::InvalidSpreadThreshold(self.spread_threshold));
        }
        if let Some(p) = self.break_probability {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(ParamsError::InvalidBreakProbability(p));
            }
        }
        Ok(())
    }
}

/// Parameter validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("Invalid history bound: {0} (minimum 20)")]
    InvalidHistory(usize),
    #[error("Invalid pattern length range: {0}..={1} (must be 3 <= min <= max <= 8)")]
    InvalidPatternLength(usize, usize),
    #[error("Invalid pattern capacity: {0} (must hold at least the seed templates)")]
    InvalidPatternCapacity(usize),
    #[error("Invalid weight bounds: [{0}, {1}] (must be 0 < min <= 1 <= max)")]
    InvalidWeightBounds(f64, f64),
    #[error("Invalid spread threshold: {0} (must be 0 < t <= 1)")]
    InvalidSpreadThreshold(f64),
    #[error("Invalid break probability: {0} (must be 0-1)")]
    InvalidBreakProbability(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EnsembleConfig::default();
        assert_eq!(config.max_history, 200);
        assert_eq!(config.min_pattern_len, 3);
        assert_eq!(config.max_pattern_len, 8);
        assert!(config.pattern_capacity.is_none());
        assert_eq!(config.tie_break, TieBreak::Reversal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = EnsembleConfig::default()
            .with_break_probability(0.8)
            .with_pattern_capacity(64)
            .with_tie_break(TieBreak::Random);
        assert_eq!(config.break_probability, Some(0.8));
        assert_eq!(config.pattern_capacity, Some(64));
        assert_eq!(config.tie_break, TieBreak::Random);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_history() {
        let config = EnsembleConfig::default().with_max_history(5);
        assert!(matches!(config.validate(), Err(ParamsError::InvalidHistory(5))));
    }

    #[test]
    fn test_invalid_pattern_settings() {
        let mut config = EnsembleConfig::default();
        config.min_pattern_len = 9;
        assert!(matches!(config.validate(), Err(ParamsError::InvalidPatternLength(9, 8))));

        let mut config = EnsembleConfig::default();
        config.min_pattern_len = 2;
        assert!(matches!(config.validate(), Err(ParamsError::InvalidPatternLength(2, 8))));

        let mut config = EnsembleConfig::default();
        config.max_pattern_len = 9;
        assert!(matches!(config.validate(), Err(ParamsError::InvalidPatternLength(3, 9))));

        let config = EnsembleConfig::default().with_pattern_capacity(3);
        assert!(matches!(config.validate(), Err(ParamsError::InvalidPatternCapacity(3))));
    }

    #[test]
    fn test_invalid_weights_and_probability() {
        let mut config = EnsembleConfig::default();
        config.min_weight = 0.0;
        assert!(config.validate().is_err());

        let config = EnsembleConfig::default().with_break_probability(1.5);
        assert!(matches!(config.validate(), Err(ParamsError::InvalidBreakProbability(_))));
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let mut config = EnsembleConfig::default();
        config.min_weight = f64::NAN;
        assert!(matches!(config.validate(), Err(ParamsError::InvalidWeightBounds(..))));

        let mut config = EnsembleConfig::default();
        config.max_weight = f64::INFINITY;
        assert!(matches!(config.validate(), Err(ParamsError::InvalidWeightBounds(..))));

        let mut config = EnsembleConfig::default();
        config.spread_threshold = f64::NAN;
        assert!(matches!(config.validate(), Err(ParamsError::InvalidSpreadThreshold(_))));

        let config = EnsembleConfig::default().with_break_probability(f64::NAN);
        assert!(matches!(config.validate(), Err(ParamsError::InvalidBreakProbability(_))));
    }

    #[test]
    fn test_tie_break_serde() {
        let parsed: TieBreak = serde_json::from_str("\"random\"").unwrap();
        assert_eq!(parsed, TieBreak::Random);
    }
}

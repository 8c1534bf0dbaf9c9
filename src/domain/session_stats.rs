//! Session Statistics
//!
//! Running counters accumulated as outcomes arrive: per-side streaks and
//! their maxima, the 2x2 transition matrix, short-window volatility and
//! the learned confidence of each pattern detector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::history::alternations;
use super::outcome::Outcome;

/// Outcomes considered by the volatility measure
pub const VOLATILITY_WINDOW: usize = 10;

/// Lower bound for a detector's learned confidence
pub const MIN_DETECTOR_CONFIDENCE: f64 = 0.1;

/// Upper bound for a detector's learned confidence
pub const MAX_DETECTOR_CONFIDENCE: f64 = 0.95;

/// Growth factor applied when a detector called the round correctly
pub const DETECTOR_GROWTH: f64 = 1.05;

/// Decay factor applied when a detector called the round wrongly
pub const DETECTOR_DECAY: f64 = 0.9;

/// A value tracked per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSide {
    pub tai: u32,
    pub xiu: u32,
}

impl PerSide {
    pub fn get(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Tai => self.tai,
            Outcome::Xiu => self.xiu,
        }
    }

    fn get_mut(&mut self, outcome: Outcome) -> &mut u32 {
        match outcome {
            Outcome::Tai => &mut self.tai,
            Outcome::Xiu => &mut self.xiu,
        }
    }
}

/// Running statistics for the current session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Length of the run currently in progress, per side (the other side is 0)
    pub current_streak: PerSide,
    /// Longest run seen, per side
    pub max_streak: PerSide,
    /// Transition counts indexed `[from][to]` (Tai = 0, Xiu = 1)
    pub transitions: [[u32; 2]; 2],
    /// Share of changing adjacent pairs in the last 10 outcomes
    pub volatility: f64,
    /// Learned confidence per pattern detector
    pub pattern_confidence: BTreeMap<String, f64>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            current_streak: PerSide::default(),
            max_streak: PerSide::default(),
            transitions: [[0; 2]; 2],
            volatility: 0.0,
            pattern_confidence: BTreeMap::new(),
        }
    }
}

impl SessionStats {
    /// Account for a newly appended outcome.
    ///
    /// `previous` is the last outcome before this one. Must run exactly once
    /// per appended outcome.
    pub fn observe(&mut self, previous: Option<Outcome>, outcome: Outcome) {
        if let Some(prev) = previous {
            self.transitions[prev.index()][outcome.index()] += 1;
        }

        *self.current_streak.get_mut(outcome) += 1;
        *self.current_streak.get_mut(outcome.opposite()) = 0;

        let current = self.current_streak.get(outcome);
        let max = self.max_streak.get_mut(outcome);
        if current > *max {
            *max = current;
        }
    }

    /// Recompute volatility from the most recent outcomes.
    ///
    /// Leaves the previous value in place until a full window is available.
    pub fn refresh_volatility(&mut self, recent: &[Outcome]) {
        if recent.len() < VOLATILITY_WINDOW {
            return;
        }
        let window = &recent[recent.len() - VOLATILITY_WINDOW..];
        self.volatility = alternations(window) as f64 / (VOLATILITY_WINDOW - 1) as f64;
    }

    /// Probability of `to` following `from`, from the transition counts
    pub fn transition_probability(&self, from: Outcome, to: Outcome) -> Option<f64> {
        let row = self.transitions[from.index()];
        let total = row[0] + row[1];
        if total == 0 {
            return None;
        }
        Some(row[to.index()] as f64 / total as f64)
    }

    /// Register a detector with its starting confidence (no-op if known)
    pub fn register_detector(&mut self, name: &str, initial: f64) {
        self.pattern_confidence
            .entry(name.to_string())
            .or_insert_with(|| initial.clamp(MIN_DETECTOR_CONFIDENCE, MAX_DETECTOR_CONFIDENCE));
    }

    /// Grow or decay a detector's confidence after it was scored
    pub fn adjust_detector(&mut self, name: &str, correct: bool) {
        if let Some(confidence) = self.pattern_confidence.get_mut(name) {
            let factor = if correct { DETECTOR_GROWTH } else { DETECTOR_DECAY };
            *confidence = (*confidence * factor).clamp(MIN_DETECTOR_CONFIDENCE, MAX_DETECTOR_CONFIDENCE);
        }
    }

    pub fn detector_confidence(&self, name: &str) -> Option<f64> {
        self.pattern_confidence.get(name).copied()
    }
}

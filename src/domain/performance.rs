//! Model Performance
//!
//! Correctness book kept per sub-model. Every scored opinion updates the
//! lifetime counters, a sliding window of recent results and the current
//! and best correctness streaks.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of scored opinions covered by the recent counters
pub const RECENT_WINDOW: usize = 20;

/// Accuracy reported for a model with no scored opinions
pub const NEUTRAL_ACCURACY: f64 = 0.5;

/// Correctness record for one sub-model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub correct: u32,
    pub total: u32,
    pub recent_correct: u32,
    pub recent_total: u32,
    /// Consecutive correct calls ending at the latest scored opinion
    pub streak: u32,
    pub max_streak: u32,
    /// Results behind the recent counters, oldest first
    #[serde(default, rename = "recent_results")]
    recent: VecDeque<bool>,
}

impl ModelPerformance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of one scored opinion
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
            self.streak += 1;
            self.max_streak = self.max_streak.max(self.streak);
        } else {
            self.streak = 0;
        }

        self.recent.push_back(correct);
        if self.recent.len() > RECENT_WINDOW {
            self.recent.pop_front();
        }
        self.recent_total = self.recent.len() as u32;
        self.recent_correct = self.recent.iter().filter(|&&c| c).count() as u32;
    }

    /// Lifetime accuracy, neutral when nothing was scored yet
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            NEUTRAL_ACCURACY
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Accuracy over the recent window, neutral when empty
    pub fn recent_accuracy(&self) -> f64 {
        if self.recent_total == 0 {
            NEUTRAL_ACCURACY
        } else {
            self.recent_correct as f64 / self.recent_total as f64
        }
    }
}

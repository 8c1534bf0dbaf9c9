//! Outcome History
//!
//! Bounded, chronological log of observed outcomes (oldest first).
//! Once the bound is reached the oldest entry is evicted on every push.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::outcome::Outcome;

/// Default maximum number of outcomes kept
pub const DEFAULT_MAX_HISTORY: usize = 200;

/// Bounded FIFO log of outcomes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeHistory {
    outcomes: VecDeque<Outcome>,
    max_len: usize,
    /// Outcomes appended over the lifetime of the log, evicted ones included
    appended: u64,
}

impl Default for OutcomeHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl OutcomeHistory {
    /// Create an empty history holding at most `max_len` outcomes
    pub fn new(max_len: usize) -> Self {
        Self {
            outcomes: VecDeque::with_capacity(max_len + 1),
            max_len,
            appended: 0,
        }
    }

    /// Append an outcome, returning the evicted one if the bound was exceeded
    pub fn push(&mut self, outcome: Outcome) -> Option<Outcome> {
        self.outcomes.push_back(outcome);
        self.appended += 1;
        if self.outcomes.len() > self.max_len {
            self.outcomes.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Lifetime append counter
    pub fn appended(&self) -> u64 {
        self.appended
    }

    /// Most recent outcome
    pub fn last(&self) -> Option<Outcome> {
        self.outcomes.back().copied()
    }

    /// Oldest retained outcome
    pub fn first(&self) -> Option<Outcome> {
        self.outcomes.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter()
    }

    /// The last `n` outcomes in chronological order (fewer if not available)
    pub fn recent(&self, n: usize) -> Vec<Outcome> {
        let skip = self.outcomes.len().saturating_sub(n);
        self.outcomes.iter().skip(skip).copied().collect()
    }

    /// All retained outcomes in chronological order
    pub fn to_vec(&self) -> Vec<Outcome> {
        self.outcomes.iter().copied().collect()
    }
}

/// Side and length of the run ending at the last element
pub fn tail_streak(outcomes: &[Outcome]) -> Option<(Outcome, usize)> {
    let last = *outcomes.last()?;
    let len = outcomes.iter().rev().take_while(|&&o| o == last).count();
    Some((last, len))
}

/// Number of adjacent pairs whose values differ
pub fn alternations(outcomes: &[Outcome]) -> usize {
    outcomes.windows(2).filter(|w| w[0] != w[1]).count()
}

/// (tai, xiu) counts
pub fn side_counts(outcomes: &[Outcome]) -> (usize, usize) {
    let tai = outcomes.iter().filter(|&&o| o == Outcome::Tai).count();
    (tai, outcomes.len() - tai)
}

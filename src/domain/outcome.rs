//! Round Outcome
//!
//! The two-valued result of a dice round. Tai ("big") covers dice totals
//! 11-18, Xiu ("small") covers 3-10.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Smallest possible three-dice total
pub const MIN_DICE_TOTAL: u8 = 3;

/// Largest possible three-dice total
pub const MAX_DICE_TOTAL: u8 = 18;

/// Totals at or above this value are Tai
pub const TAI_THRESHOLD: u8 = 11;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutcomeError {
    #[error("Invalid outcome label: {0:?}")]
    InvalidOutcome(String),

    #[error("Invalid dice total: {0} (must be 3-18)")]
    InvalidTotal(u8),
}

/// Observed result of one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Tai,
    Xiu,
}

impl Outcome {
    /// The other value
    pub fn opposite(self) -> Self {
        match self {
            Outcome::Tai => Outcome::Xiu,
            Outcome::Xiu => Outcome::Tai,
        }
    }

    /// Map a three-dice total onto an outcome
    pub fn from_total(total: u8) -> Result<Self, OutcomeError> {
        if !(MIN_DICE_TOTAL..=MAX_DICE_TOTAL).contains(&total) {
            return Err(OutcomeError::InvalidTotal(total));
        }
        if total >= TAI_THRESHOLD {
            Ok(Outcome::Tai)
        } else {
            Ok(Outcome::Xiu)
        }
    }

    /// Row/column index in the transition matrix
    pub fn index(self) -> usize {
        match self {
            Outcome::Tai => 0,
            Outcome::Xiu => 1,
        }
    }

    /// Single-character symbol used for pattern keys
    pub fn symbol(self) -> char {
        match self {
            Outcome::Tai => 'T',
            Outcome::Xiu => 'X',
        }
    }

    /// Display label as published by the round feed
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Tai => "Tài",
            Outcome::Xiu => "Xỉu",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Outcome {
    type Err = OutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tài" | "tai" | "t" | "big" => Ok(Outcome::Tai),
            "xỉu" | "xiu" | "x" | "small" => Ok(Outcome::Xiu),
            _ => Err(OutcomeError::InvalidOutcome(s.to_string())),
        }
    }
}

/// Encode a sequence as a compact symbol string ("TXXT")
pub fn encode(outcomes: &[Outcome]) -> String {
    outcomes.iter().map(|o| o.symbol()).collect()
}

//! Round Record
//!
//! Normalised form of one published round. Feeds are inconsistent about
//! field casing (`phien` vs `Phien`), so every field accepts both spellings
//! and missing values fall back to neutral defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::outcome::{Outcome, OutcomeError};

/// Placeholder label used by feeds when a round has no result yet
pub const UNKNOWN_RESULT: &str = "Không rõ";

fn unknown_result() -> String {
    UNKNOWN_RESULT.to_string()
}

/// One published round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round (session) number
    #[serde(rename = "phien", alias = "Phien", default)]
    pub round: u64,
    /// First die
    #[serde(rename = "xuc_xac_1", alias = "Xuc_xac_1", default)]
    pub dice_1: u8,
    /// Second die
    #[serde(rename = "xuc_xac_2", alias = "Xuc_xac_2", default)]
    pub dice_2: u8,
    /// Third die
    #[serde(rename = "xuc_xac_3", alias = "Xuc_xac_3", default)]
    pub dice_3: u8,
    /// Dice total
    #[serde(rename = "tong", alias = "Tong", default)]
    pub total: u8,
    /// Result label ("Tài" / "Xỉu")
    #[serde(rename = "ket_qua", alias = "Ket_qua", default = "unknown_result")]
    pub result: String,
}

impl RoundRecord {
    /// Build a record from its parts
    pub fn new(round: u64, dice: [u8; 3], result: &str) -> Self {
        Self {
            round,
            dice_1: dice[0],
            dice_2: dice[1],
            dice_3: dice[2],
            total: dice.iter().sum(),
            result: result.to_string(),
        }
    }

    /// Dice values as an array
    pub fn dice(&self) -> [u8; 3] {
        [self.dice_1, self.dice_2, self.dice_3]
    }

    /// True when all three dice were published
    pub fn has_dice(&self) -> bool {
        self.dice().iter().all(|d| (1..=6).contains(d))
    }

    /// Resolve the round's outcome from its label.
    ///
    /// The label is authoritative. Dice data that contradicts it is logged
    /// but never overrides it; an unknown label is rejected so it can never
    /// reach the history.
    pub fn outcome(&self) -> Result<Outcome, OutcomeError> {
        let outcome: Outcome = self.result.parse()?;

        if self.has_dice() {
            let dice_sum: u8 = self.dice().iter().sum();
            if dice_sum != self.total {
                warn!(
                    "Round {}: dice sum {} does not match published total {}",
                    self.round, dice_sum, self.total
                );
            }
        }

        if let Ok(from_total) = Outcome::from_total(self.total) {
            if from_total != outcome {
                warn!(
                    "Round {}: label {} disagrees with total {} ({})",
                    self.round, outcome, self.total, from_total
                );
            }
        }

        Ok(outcome)
    }
}

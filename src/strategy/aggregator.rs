//! Ensemble Aggregator
//!
//! Weighted vote over the primitive opinions. Each opinion adds
//! `weight * confidence` to its side; the heavier side wins with confidence
//! `winner / total`. Meta opinions never vote.

use serde::{Deserialize, Serialize};

use crate::domain::Outcome;
use super::models::ModelOpinion;
use super::params::TieBreak;
use super::registry::ModelKind;
use super::weights::WeightAdjuster;

/// Confidence reported when nothing contributed
pub const UNDETERMINED_CONFIDENCE: f64 = 0.5;

/// Weighted vote result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consensus {
    pub prediction: Outcome,
    pub confidence: f64,
    pub rationale: String,
    pub tai_mass: f64,
    pub xiu_mass: f64,
    /// Primitive models that voted
    pub contributors: usize,
}

/// Default side for a tie or an empty vote
pub fn tie_break(policy: TieBreak, last: Option<Outcome>) -> Outcome {
    match policy {
        TieBreak::Reversal => last.map(|o| o.opposite()).unwrap_or(Outcome::Tai),
        TieBreak::Random => {
            if rand::random::<bool>() {
                Outcome::Tai
            } else {
                Outcome::Xiu
            }
        }
    }
}

pub fn aggregate(
    primitives: &[(ModelKind, ModelOpinion)],
    weights: &WeightAdjuster,
    policy: TieBreak,
    last: Option<Outcome>,
) -> Consensus {
    let mut tai_mass = 0.0;
    let mut xiu_mass = 0.0;
    let mut contributors = 0;

    for (kind, opinion) in primitives {
        let Some(prediction) = opinion.prediction else {
            continue;
        };
        let mass = weights.weight(*kind) * opinion.confidence;
        match prediction {
            Outcome::Tai => tai_mass += mass,
            Outcome::Xiu => xiu_mass += mass,
        }
        contributors += 1;
    }

    let total = tai_mass + xiu_mass;
    if total <= 0.0 {
        let prediction = tie_break(policy, last);
        return Consensus {
            prediction,
            confidence: UNDETERMINED_CONFIDENCE,
            rationale: format!("undetermined: no model has an opinion, defaulting to {}", prediction),
            tai_mass,
            xiu_mass,
            contributors,
        };
    }

    let (prediction, winner, how) = if tai_mass > xiu_mass {
        (Outcome::Tai, tai_mass, "majority")
    } else if xiu_mass > tai_mass {
        (Outcome::Xiu, xiu_mass, "majority")
    } else {
        (tie_break(policy, last), tai_mass, "tie broken")
    };

    Consensus {
        prediction,
        confidence: winner / total,
        rationale: format!(
            "{} of {} models, {} (Tai {:.3} / Xiu {:.3})",
            prediction, contributors, how, tai_mass, xiu_mass
        ),
        tai_mass,
        xiu_mass,
        contributors,
    }
}

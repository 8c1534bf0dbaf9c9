//! Ensemble Weight Balancer (meta)
//!
//! Leans against a lopsided primitive vote. Reads the primitive opinions and
//! nothing else, so it never sees its own output or the aggregate.

use crate::domain::{side_counts, Outcome};
use crate::strategy::registry::ModelKind;
use super::{ModelOpinion, MAX_CONFIDENCE};

/// Primitive opinions with a prediction needed before balancing
pub const MIN_VOTES: usize = 5;

/// Vote imbalance above which the minority side is backed
pub const IMBALANCE_THRESHOLD: f64 = 0.6;

const IMBALANCE_SCALE: f64 = 0.9;

pub fn evaluate(primitives: &[(ModelKind, ModelOpinion)]) -> ModelOpinion {
    let votes: Vec<_> = primitives.iter().filter_map(|(_, o)| o.prediction).collect();
    if votes.len() < MIN_VOTES {
        return ModelOpinion::none(format!("needs {} votes, have {}", MIN_VOTES, votes.len()));
    }

    let (tai, xiu) = side_counts(&votes);
    let imbalance = tai.abs_diff(xiu) as f64 / votes.len() as f64;
    if imbalance <= IMBALANCE_THRESHOLD {
        return ModelOpinion::none(format!("vote balanced enough ({} Tai / {} Xiu)", tai, xiu));
    }

    let minority = if tai > xiu { Outcome::Xiu } else { Outcome::Tai };
    ModelOpinion::new(
        minority,
        (imbalance * IMBALANCE_SCALE).min(MAX_CONFIDENCE),
        format!("models lean {} Tai / {} Xiu, balancing toward {}", tai, xiu, minority),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use Outcome::{Tai, Xiu};
    use approx::assert_relative_eq;

    fn votes(sides: &[Option<Outcome>]) -> Vec<(ModelKind, ModelOpinion)> {
        sides
            .iter()
            .map(|side| {
                let opinion = match side {
                    Some(o) => ModelOpinion::new(*o, 0.6, "vote"),
                    None => ModelOpinion::none("abstain"),
                };
                (ModelKind::Trend, opinion)
            })
            .collect()
    }

    #[test]
    fn test_needs_five_votes() {
        let opinion = evaluate(&votes(&[Some(Tai), Some(Tai), Some(Tai), Some(Tai), None]));
        assert!(!opinion.has_prediction());
    }

    #[test]
    fn test_unanimous_vote_is_balanced_toward_minority() {
        let opinion = evaluate(&votes(&[Some(Tai); 5]));
        assert_eq!(opinion.prediction, Some(Xiu));
        assert_relative_eq!(opinion.confidence, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_moderate_lean_is_silent() {
        // 4 vs 1: imbalance 0.6 is not above the threshold
        let opinion = evaluate(&votes(&[Some(Xiu), Some(Xiu), Some(Xiu), Some(Xiu), Some(Tai)]));
        assert!(!opinion.has_prediction());
    }
}

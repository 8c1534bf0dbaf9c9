//! Pattern-Match Model
//!
//! Matches the tail of the last 10 outcomes against every pattern prefix in
//! the database and follows the most probable match.

use crate::domain::Regime;
use super::{regime_multiplier, ModelContext, ModelOpinion, MAX_CONFIDENCE};

/// Outcomes examined for prefix matching
pub const LOOKBACK: usize = 10;

/// Minimum history before the model speaks
pub const MIN_HISTORY: usize = 4;

const PROBABILITY_SCALE: f64 = 0.8;
const REGIME_TABLE: [(Regime, f64); 2] = [(Regime::Trending, 1.1), (Regime::Volatile, 0.9)];

pub fn evaluate(ctx: &ModelContext<'_>) -> ModelOpinion {
    if ctx.len() < MIN_HISTORY {
        return ModelOpinion::none(format!("needs {} outcomes, have {}", MIN_HISTORY, ctx.len()));
    }

    let recent = ctx.recent(LOOKBACK);
    let mut best = None;
    for entry in ctx.patterns.matching(recent) {
        let Some(predicts) = entry.predicts() else {
            continue;
        };
        let better = match best {
            Some((_, probability, _)) => entry.probability > probability,
            None => true,
        };
        if better {
            best = Some((predicts, entry.probability, entry));
        }
    }

    let Some((prediction, probability, entry)) = best else {
        return ModelOpinion::none("no pattern prefix matches recent history");
    };

    let multiplier = regime_multiplier(ctx.regime(), &REGIME_TABLE);
    let confidence = (probability * PROBABILITY_SCALE * multiplier).min(MAX_CONFIDENCE);

    ModelOpinion::new(
        prediction,
        confidence,
        format!(
            "pattern {} (p={:.2}, strength={:.2}) predicts {}",
            crate::domain::encode(&entry.pattern),
            probability,
            entry.strength,
            prediction
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Outcome;
    use crate::strategy::models::fixtures::Fixture;

    #[test]
    fn test_no_opinion_with_short_history() {
        let fixture = Fixture::of("TXT");
        assert!(!evaluate(&fixture.ctx()).has_prediction());
    }

    #[test]
    fn test_alternation_matches_seed() {
        // Tail "XTXT" matches the XTXTX seed prefix (p = 0.70)
        let fixture = Fixture::of("TTXTXT");
        let opinion = evaluate(&fixture.ctx());
        assert_eq!(opinion.prediction, Some(Outcome::Xiu));
        assert!((opinion.confidence - 0.70 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_regime_adjustment() {
        let trending = Fixture::of("TTXTXT").with_regime(Regime::Trending);
        let opinion = evaluate(&trending.ctx());
        assert!((opinion.confidence - 0.70 * 0.8 * 1.1).abs() < 1e-9);

        let volatile = Fixture::of("TTXTXT").with_regime(Regime::Volatile);
        let opinion = evaluate(&volatile.ctx());
        assert!((opinion.confidence - 0.70 * 0.8 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_no_match() {
        // Tail "TTTT" has no seed prefix ("TTTX"/"TTTTX" prefixes need an X)
        let fixture = Fixture::of("TTTT");
        assert!(!evaluate(&fixture.ctx()).has_prediction());
    }

    #[test]
    fn test_highest_probability_wins() {
        // "TTXT" matches TTXTT (0.65); tail "TXT" alone matches nothing longer
        let fixture = Fixture::of("XTTXT");
        let opinion = evaluate(&fixture.ctx());
        assert_eq!(opinion.prediction, Some(Outcome::Tai));
        assert!((opinion.confidence - 0.65 * 0.8).abs() < 1e-9);
    }
}

//! Mean-Reversion Model
//!
//! Bets on the minority side once the last 12 outcomes are lopsided enough.

use crate::domain::{side_counts, Outcome, Regime};
use super::{regime_multiplier, ModelContext, ModelOpinion, MAX_CONFIDENCE};

pub const WINDOW: usize = 12;

/// Imbalance below which the model stays silent
pub const MIN_IMBALANCE: f64 = 0.4;

const IMBALANCE_SCALE: f64 = 0.8;
const REGIME_TABLE: [(Regime, f64); 2] = [(Regime::Random, 1.1), (Regime::Trending, 0.9)];

pub fn evaluate(ctx: &ModelContext<'_>) -> ModelOpinion {
    if ctx.len() < WINDOW {
        return ModelOpinion::none(format!("needs {} outcomes, have {}", WINDOW, ctx.len()));
    }

    let (tai, xiu) = side_counts(ctx.recent(WINDOW));
    let imbalance = tai.abs_diff(xiu) as f64 / WINDOW as f64;
    if imbalance < MIN_IMBALANCE {
        return ModelOpinion::none(format!("balanced window ({} Tai / {} Xiu)", tai, xiu));
    }

    let minority = if tai > xiu { Outcome::Xiu } else { Outcome::Tai };
    let multiplier = regime_multiplier(ctx.regime(), &REGIME_TABLE);
    let confidence = (imbalance * IMBALANCE_SCALE * multiplier).min(MAX_CONFIDENCE);

    ModelOpinion::new(
        minority,
        confidence,
        format!(
            "{} Tai / {} Xiu over last {} (imbalance {:.2}), expecting {}",
            tai, xiu, WINDOW, imbalance, minority
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::models::fixtures::Fixture;
    use approx::assert_relative_eq;

    #[test]
    fn test_needs_twelve() {
        let fixture = Fixture::of("TTTTTTTTTTT");
        assert!(!evaluate(&fixture.ctx()).has_prediction());
    }

    #[test]
    fn test_nine_to_three_predicts_minority() {
        let fixture = Fixture::of("TTTXTTTXTTTX");
        let opinion = evaluate(&fixture.ctx());
        assert_eq!(opinion.prediction, Some(Outcome::Xiu));
        // imbalance 6/12 = 0.5, Normal regime
        assert_relative_eq!(opinion.confidence, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_balanced_window_is_silent() {
        // 7 vs 5: imbalance 0.167
        let fixture = Fixture::of("TXTXTXTXTXTT");
        assert!(!evaluate(&fixture.ctx()).has_prediction());
    }

    #[test]
    fn test_regime_multipliers() {
        let random = Fixture::of("XXXTXXXTXXXT").with_regime(Regime::Random);
        let opinion = evaluate(&random.ctx());
        assert_eq!(opinion.prediction, Some(Outcome::Tai));
        assert_relative_eq!(opinion.confidence, 0.44, epsilon = 1e-9);

        let trending = Fixture::of("XXXTXXXTXXXT").with_regime(Regime::Trending);
        assert_relative_eq!(evaluate(&trending.ctx()).confidence, 0.36, epsilon = 1e-9);
    }

    #[test]
    fn test_uses_only_most_recent_twelve() {
        // Older Xiu run falls outside the window
        let fixture = Fixture::of("XXXXXXXXTXTXTXTXTXTXTX");
        assert!(!evaluate(&fixture.ctx()).has_prediction());
    }
}

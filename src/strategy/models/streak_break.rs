//! Streak-Break Decision Model
//!
//! When a long streak meets a high break probability, bets against the trend
//! model. Otherwise it simply follows the trend model at a discount.
//!
//! The break probability is the configured override when set. Without one it
//! is estimated from completed runs earlier in history: among the runs that
//! reached the current streak length, the share that ended right there.

use crate::domain::{tail_streak, Outcome};
use super::{trend, ModelContext, ModelOpinion, MAX_CONFIDENCE};

/// Outcomes inspected for the current streak
pub const STREAK_WINDOW: usize = 8;

/// Streak length at which a break is considered
pub const MIN_STREAK: usize = 5;

/// Break probability needed to bet on a break
pub const BREAK_THRESHOLD: f64 = 0.7;

/// Completed runs needed before the estimate is trusted
pub const MIN_RUN_SAMPLES: usize = 3;

/// Break probability with no override and too few samples
pub const DEFAULT_BREAK_PROBABILITY: f64 = 0.5;

const BREAK_SCALE: f64 = 0.8;
const DEFER_SCALE: f64 = 0.9;

/// Maximal runs of identical outcomes, oldest first
fn runs(history: &[Outcome]) -> Vec<(Outcome, usize)> {
    let mut runs: Vec<(Outcome, usize)> = Vec::new();
    for &outcome in history {
        match runs.last_mut() {
            Some((side, len)) if *side == outcome => *len += 1,
            _ => runs.push((outcome, 1)),
        }
    }
    runs
}

/// Share of completed runs of length >= `streak` that stopped at exactly `streak`
pub fn estimate_break_probability(history: &[Outcome], streak: usize) -> Option<f64> {
    let mut completed = runs(history);
    // The run in progress has not ended yet
    completed.pop();

    let reached: Vec<usize> = completed
        .iter()
        .map(|&(_, len)| len)
        .filter(|&len| len >= streak)
        .collect();
    if reached.len() < MIN_RUN_SAMPLES {
        return None;
    }
    let ended = reached.iter().filter(|&&len| len == streak).count();
    Some(ended as f64 / reached.len() as f64)
}

/// Break probability in effect for the current context
pub fn break_probability(ctx: &ModelContext<'_>, streak: usize) -> f64 {
    ctx.break_probability
        .or_else(|| estimate_break_probability(ctx.history, streak))
        .unwrap_or(DEFAULT_BREAK_PROBABILITY)
}

pub fn evaluate(ctx: &ModelContext<'_>) -> ModelOpinion {
    let trend_opinion = trend::evaluate(ctx);

    let Some((side, streak)) = tail_streak(ctx.recent(STREAK_WINDOW)) else {
        return trend_opinion.scaled(DEFER_SCALE, "no history, deferring to trend");
    };

    if streak >= MIN_STREAK {
        let probability = break_probability(ctx, streak);
        if probability > BREAK_THRESHOLD {
            let against = trend_opinion.prediction.unwrap_or(side);
            let prediction = against.opposite();
            return ModelOpinion::new(
                prediction,
                (probability * BREAK_SCALE).min(MAX_CONFIDENCE),
                format!(
                    "{}-long {} streak, break probability {:.2}, expecting {}",
                    streak, side, probability, prediction
                ),
            );
        }
    }

    trend_opinion.scaled(
        DEFER_SCALE,
        format!("{}-long {} streak, deferring to trend", streak, side),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::models::fixtures::{parse, Fixture};
    use approx::assert_relative_eq;

    #[test]
    fn test_runs() {
        let runs = runs(&parse("TTXTTT"));
        assert_eq!(runs, vec![(Outcome::Tai, 2), (Outcome::Xiu, 1), (Outcome::Tai, 3)]);
    }

    #[test]
    fn test_forced_break_probability_reverses_streak() {
        let mut fixture = Fixture::of("TTTTTT");
        fixture.break_probability = Some(0.8);
        let opinion = evaluate(&fixture.ctx());
        // Trend is silent below 10 outcomes, so the streak side is reversed
        assert_eq!(opinion.prediction, Some(Outcome::Xiu));
        assert_relative_eq!(opinion.confidence, 0.64, epsilon = 1e-9);
    }

    #[test]
    fn test_low_break_probability_defers() {
        let mut fixture = Fixture::of("TTTTTT");
        fixture.break_probability = Some(0.6);
        let opinion = evaluate(&fixture.ctx());
        assert!(!opinion.has_prediction());
    }

    #[test]
    fn test_defers_to_trend_scaled() {
        let fixture = Fixture::of("XXXXXXXXXXXX");
        let mut forced = Fixture::of("XXXXXXXXXXXX");
        forced.break_probability = Some(0.1);
        let trend = trend::evaluate(&fixture.ctx());
        let opinion = evaluate(&forced.ctx());
        assert_eq!(opinion.prediction, trend.prediction);
        assert_relative_eq!(opinion.confidence, trend.confidence * 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_break_reverses_trend_call() {
        let mut fixture = Fixture::of("XXXXXXXXXXXX");
        fixture.break_probability = Some(0.9);
        let opinion = evaluate(&fixture.ctx());
        assert_eq!(opinion.prediction, Some(Outcome::Tai));
        assert_relative_eq!(opinion.confidence, 0.72, epsilon = 1e-9);
    }

    #[test]
    fn test_estimate_from_history() {
        // Completed runs of length >= 5: 5, 5, 6, then a live 5-run
        let history = parse("TTTTTXXXXXTTTTTTXTTTTT");
        let estimate = estimate_break_probability(&history, 5);
        assert_relative_eq!(estimate.unwrap(), 2.0 / 3.0, epsilon = 1e-9);

        // Not enough long runs
        assert!(estimate_break_probability(&history, 6).is_none());
    }

    #[test]
    fn test_estimate_used_without_override() {
        // Four completed 5-runs all ended at 5, live 5-run of Tai
        let fixture = Fixture::of("TTTTTXXXXXTTTTTXXXXXTTTTT");
        let opinion = evaluate(&fixture.ctx());
        // Short window carries the trend call (Tai), which gets reversed
        assert_eq!(opinion.prediction, Some(Outcome::Xiu));
        assert!(opinion.rationale.contains("break probability 1.00"));
        assert_relative_eq!(opinion.confidence, 0.8, epsilon = 1e-9);
    }
}

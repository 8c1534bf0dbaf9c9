//! Short-Term Momentum Model
//!
//! Reads only the last four outcomes:
//! - last 3 unanimous → continuation (0.70)
//! - last 4 mostly alternating → reversal of the last value (0.60)
//! - last two agree → weak continuation (0.65)
//! - otherwise repeat the last value (0.55)
//!
//! After the regime adjustment anything below 0.6 is dropped.

use crate::domain::{alternations, Outcome, Regime};
use super::{regime_multiplier, ModelContext, ModelOpinion, MAX_CONFIDENCE};

pub const MIN_HISTORY: usize = 4;

/// Adjusted confidence below this yields no opinion
pub const MIN_CONFIDENCE: f64 = 0.6;

const UNANIMOUS: f64 = 0.70;
const CHOPPY_REVERSAL: f64 = 0.60;
const PAIR_CONTINUATION: f64 = 0.65;
const REPEAT_LAST: f64 = 0.55;
const REGIME_TABLE: [(Regime, f64); 2] = [(Regime::Trending, 1.1), (Regime::Volatile, 0.9)];

/// Raw call before the regime adjustment
fn raw_call(last4: &[Outcome]) -> (Outcome, f64, &'static str) {
    let last = last4[last4.len() - 1];
    let last3 = &last4[last4.len() - 3..];

    if last3.iter().all(|o| *o == last) {
        (last, UNANIMOUS, "last 3 unanimous")
    } else if alternations(last4) >= 3 {
        (last.opposite(), CHOPPY_REVERSAL, "choppy last 4, reversal")
    } else if last4[last4.len() - 2] == last {
        (last, PAIR_CONTINUATION, "last two agree")
    } else {
        (last, REPEAT_LAST, "repeat last")
    }
}

pub fn evaluate(ctx: &ModelContext<'_>) -> ModelOpinion {
    if ctx.len() < MIN_HISTORY {
        return ModelOpinion::none(format!("needs {} outcomes, have {}", MIN_HISTORY, ctx.len()));
    }

    let last4 = ctx.recent(MIN_HISTORY);
    let (prediction, base, reason) = raw_call(last4);
    let multiplier = regime_multiplier(ctx.regime(), &REGIME_TABLE);
    let confidence = (base * multiplier).min(MAX_CONFIDENCE);

    if confidence < MIN_CONFIDENCE {
        return ModelOpinion::none(format!("{} too weak ({:.2})", reason, confidence));
    }

    ModelOpinion::new(prediction, confidence, format!("{}, expecting {}", reason, prediction))
}

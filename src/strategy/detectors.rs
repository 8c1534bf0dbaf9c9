//! Advanced Pattern Detectors
//!
//! Boolean triggers over the tail of history, each with a fixed confidence:
//! - **streak**: last 4+ identical → continue (0.62)
//! - **alternating**: last 5+ strictly alternating → opposite of last (0.68)
//! - **double_pair**: last 4 shaped AABB → A (0.60)
//! - **cyclic_repeat**: last p equal the p before them, p in 3..=8 → the
//!   outcome p positions back from the forecast slot (0.72)
//!
//! Readings are reported alongside the prediction and do not vote. Their
//! track record lives in `SessionStats::pattern_confidence` and is reported
//! as `reliability`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{encode, tail_streak, Outcome, SessionStats};

pub const STREAK_MIN: usize = 4;
pub const ALTERNATING_MIN: usize = 5;
pub const MIN_CYCLE: usize = 3;
pub const MAX_CYCLE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    Streak,
    Alternating,
    DoublePair,
    CyclicRepeat,
}

impl DetectorKind {
    pub const ALL: [DetectorKind; 4] = [
        Self::Streak,
        Self::Alternating,
        Self::DoublePair,
        Self::CyclicRepeat,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Streak => "streak",
            Self::Alternating => "alternating",
            Self::DoublePair => "double_pair",
            Self::CyclicRepeat => "cyclic_repeat",
        }
    }

    /// Fixed confidence reported when the detector fires
    pub fn base_confidence(&self) -> f64 {
        match self {
            Self::Streak => 0.62,
            Self::Alternating => 0.68,
            Self::DoublePair => 0.60,
            Self::CyclicRepeat => 0.72,
        }
    }

    /// Prediction and rationale when the detector fires on `history`
    pub fn detect(&self, history: &[Outcome]) -> Option<(Outcome, String)> {
        match self {
            Self::Streak => streak(history),
            Self::Alternating => alternating(history),
            Self::DoublePair => double_pair(history),
            Self::CyclicRepeat => cyclic_repeat(history),
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A detector that fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSignal {
    pub detector: DetectorKind,
    pub prediction: Outcome,
    pub confidence: f64,
    /// Session-adjusted confidence from the detector's track record
    pub reliability: f64,
    pub rationale: String,
}

fn streak(history: &[Outcome]) -> Option<(Outcome, String)> {
    let (side, len) = tail_streak(history)?;
    (len >= STREAK_MIN).then(|| (side, format!("{}-long {} streak continues", len, side)))
}

fn alternating(history: &[Outcome]) -> Option<(Outcome, String)> {
    if history.len() < ALTERNATING_MIN {
        return None;
    }
    let tail = &history[history.len() - ALTERNATING_MIN..];
    let strict = tail.windows(2).all(|w| w[0] != w[1]);
    let last = *tail.last()?;
    strict.then(|| (last.opposite(), format!("alternation {} continues", encode(tail))))
}

fn double_pair(history: &[Outcome]) -> Option<(Outcome, String)> {
    let tail = history.get(history.len().checked_sub(4)?..)?;
    let shaped = tail[0] == tail[1] && tail[2] == tail[3] && tail[1] != tail[2];
    shaped.then(|| (tail[0], format!("double pair {} repeats", encode(tail))))
}

fn cyclic_repeat(history: &[Outcome]) -> Option<(Outcome, String)> {
    let n = history.len();
    (MIN_CYCLE..=MAX_CYCLE)
        .filter(|&p| n >= 2 * p)
        .find(|&p| (n - p..n).all(|i| history[i] == history[i - p]))
        .map(|p| {
            let prediction = history[n - p];
            (
                prediction,
                format!("cycle of {} ({}) repeats", p, encode(&history[n - p..])),
            )
        })
}

/// Run every detector and collect those that fire
pub fn detect_all(history: &[Outcome], stats: &SessionStats) -> Vec<DetectorSignal> {
    DetectorKind::ALL
        .iter()
        .filter_map(|kind| {
            let (prediction, rationale) = kind.detect(history)?;
            Some(DetectorSignal {
                detector: *kind,
                prediction,
                confidence: kind.base_confidence(),
                reliability: stats
                    .detector_confidence(kind.name())
                    .unwrap_or_else(|| kind.base_confidence()),
                rationale,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::models::fixtures::parse;
    use Outcome::{Tai, Xiu};

    fn fired(history: &str) -> Vec<DetectorKind> {
        detect_all(&parse(history), &SessionStats::default())
            .into_iter()
            .map(|s| s.detector)
            .collect()
    }

    #[test]
    fn test_streak_detector() {
        assert_eq!(streak(&parse("XTTTT")).map(|(o, _)| o), Some(Tai));
        assert!(streak(&parse("TTT")).is_none());
    }

    #[test]
    fn test_alternating_detector() {
        let signals = detect_all(&parse("TXTXT"), &SessionStats::default());
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].detector, DetectorKind::Alternating);
        assert_eq!(signals[0].prediction, Xiu);
        assert_eq!(signals[0].confidence, 0.68);
        assert!(alternating(&parse("TXTX")).is_none());
        assert!(alternating(&parse("TXTTX")).is_none());
    }

    #[test]
    fn test_double_pair_detector() {
        assert_eq!(double_pair(&parse("TTXX")).map(|(o, _)| o), Some(Tai));
        assert_eq!(double_pair(&parse("TXXTT")).map(|(o, _)| o), Some(Xiu));
        assert!(double_pair(&parse("TTTT")).is_none());
        assert!(double_pair(&parse("TXX")).is_none());
    }

    #[test]
    fn test_cyclic_repeat_shortest_period_wins() {
        // Period 3 and period 6 both repeat
        let history = parse("TTXTTXTTXTTX");
        let (prediction, rationale) = cyclic_repeat(&history).unwrap();
        assert!(rationale.starts_with("cycle of 3"));
        assert_eq!(prediction, Tai);
    }

    #[test]
    fn test_cyclic_repeat_needs_two_periods() {
        assert!(cyclic_repeat(&parse("TXXTX")).is_none());
        assert!(cyclic_repeat(&parse("TXTTXT")).is_some());
    }

    #[test]
    fn test_nothing_fires_on_short_history() {
        assert!(fired("").is_empty());
        assert!(fired("TX").is_empty());
    }

    #[test]
    fn test_reliability_follows_session_stats() {
        let mut stats = SessionStats::default();
        stats.register_detector("streak", 0.62);
        stats.adjust_detector("streak", false);
        let signals = detect_all(&parse("TTTTT"), &stats);
        let streak = signals.iter().find(|s| s.detector == DetectorKind::Streak).unwrap();
        assert_eq!(streak.confidence, 0.62);
        assert!((streak.reliability - 0.62 * 0.9).abs() < 1e-9);
    }
}

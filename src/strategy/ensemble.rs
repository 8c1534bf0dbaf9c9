//! Ensemble Predictor
//!
//! Owns every piece of predictor state and exposes the three operations the
//! round loop drives:
//!
//! 1. `score_previous_opinions(outcome)` grades the last prediction's opinions
//! 2. `record_outcome(outcome)` appends and refreshes derived state
//! 3. `predict_next()` runs all models, re-weights and aggregates
//!
//! Opinions produced by `predict_next` are retained together with the history
//! generation they were computed at. Scoring uses them while they are still
//! current; once an outcome has been appended in between, the models are
//! re-run against the present (pre-append) state instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{
    MarketState, ModelPerformance, Outcome, OutcomeError, OutcomeHistory, SessionStats,
};
use super::aggregator::{aggregate, Consensus};
use super::detectors::{detect_all, DetectorKind, DetectorSignal};
use super::models::ModelContext;
use super::params::{EnsembleConfig, ParamsError};
use super::pattern_db::PatternDatabase;
use super::registry::{evaluate_all, ModelKind, OpinionSet};
use super::weights::WeightAdjuster;

#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error(transparent)]
    Outcome(#[from] OutcomeError),

    #[error("Invalid ensemble parameters: {0}")]
    Params(#[from] ParamsError),
}

/// State snapshot reported with every prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    pub session_stats: SessionStats,
    pub market_state: MarketState,
    pub history_len: usize,
    pub pattern_count: usize,
}

/// Next-round forecast with everything that went into it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: Outcome,
    pub confidence: f64,
    pub rationale: String,
    pub opinions: OpinionSet,
    pub weights: BTreeMap<ModelKind, f64>,
    pub detectors: Vec<DetectorSignal>,
    pub diagnostics: Diagnostics,
}

/// Opinions kept from the last prediction for scoring
#[derive(Debug, Clone)]
struct RetainedOpinions {
    generation: u64,
    opinions: OpinionSet,
    detectors: Vec<DetectorSignal>,
}

#[derive(Debug, Clone)]
pub struct EnsemblePredictor {
    config: EnsembleConfig,
    history: OutcomeHistory,
    stats: SessionStats,
    market: MarketState,
    patterns: PatternDatabase,
    performance: BTreeMap<ModelKind, ModelPerformance>,
    weights: WeightAdjuster,
    retained: Option<RetainedOpinions>,
}

impl Default for EnsemblePredictor {
    fn default() -> Self {
        Self::build(EnsembleConfig::default())
    }
}

impl EnsemblePredictor {
    pub fn new(config: EnsembleConfig) -> Result<Self, EnsembleError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EnsembleConfig) -> Self {
        let mut stats = SessionStats::default();
        for kind in DetectorKind::ALL {
            stats.register_detector(kind.name(), kind.base_confidence());
        }

        Self {
            history: OutcomeHistory::new(config.max_history),
            patterns: PatternDatabase::new(
                config.min_pattern_len,
                config.max_pattern_len,
                config.pattern_capacity,
            ),
            weights: WeightAdjuster::new(&config),
            stats,
            market: MarketState::default(),
            performance: BTreeMap::new(),
            retained: None,
            config,
        }
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    pub fn history(&self) -> &OutcomeHistory {
        &self.history
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn market_state(&self) -> &MarketState {
        &self.market
    }

    pub fn patterns(&self) -> &PatternDatabase {
        &self.patterns
    }

    pub fn performance(&self) -> &BTreeMap<ModelKind, ModelPerformance> {
        &self.performance
    }

    pub fn weights(&self) -> &BTreeMap<ModelKind, f64> {
        self.weights.weights()
    }

    fn context<'a>(&'a self, history: &'a [Outcome]) -> ModelContext<'a> {
        ModelContext {
            history,
            stats: &self.stats,
            market: &self.market,
            patterns: &self.patterns,
            break_probability: self.config.break_probability,
        }
    }

    /// Append one observed outcome and refresh everything derived from history
    pub fn record_outcome(&mut self, outcome: Outcome) {
        let previous = self.history.last();
        if let Some(evicted) = self.history.push(outcome) {
            debug!("History full, evicted oldest outcome {}", evicted);
        }
        self.stats.observe(previous, outcome);

        let history = self.history.to_vec();
        self.stats.refresh_volatility(&history);
        if let Some(market) = MarketState::classify(&history) {
            self.market = market;
        }

        let mined = self.patterns.mine(&history, self.history.appended());
        if mined > 0 {
            debug!("Pattern database grew by {} to {}", mined, self.patterns.len());
        }
    }

    /// Parse a result label and record it. Unknown labels leave state untouched.
    pub fn record_label(&mut self, label: &str) -> Result<Outcome, EnsembleError> {
        let outcome: Outcome = label.parse()?;
        self.record_outcome(outcome);
        Ok(outcome)
    }

    /// Grade each model's last opinion against the observed outcome.
    ///
    /// Call before `record_outcome` for the same round.
    pub fn score_previous_opinions(&mut self, outcome: Outcome) {
        let generation = self.history.appended();
        let (opinions, detectors) = match self.retained.take() {
            Some(retained) if retained.generation == generation => {
                (retained.opinions, retained.detectors)
            }
            stale => {
                if stale.is_some() {
                    warn!("Retained opinions are stale, re-evaluating against current history");
                }
                let history = self.history.to_vec();
                let ctx = self.context(&history);
                (evaluate_all(&ctx), detect_all(&history, &self.stats))
            }
        };

        for (kind, opinion) in opinions.iter() {
            if let Some(prediction) = opinion.prediction {
                self.performance
                    .entry(*kind)
                    .or_default()
                    .record(prediction == outcome);
            }
        }
        for signal in detectors {
            self.stats
                .adjust_detector(signal.detector.name(), signal.prediction == outcome);
        }
    }

    /// Forecast the next outcome.
    ///
    /// Repeated calls without an intervening append or score return the same
    /// forecast (random tie-break excepted).
    pub fn predict_next(&mut self) -> Prediction {
        let history = self.history.to_vec();
        let (opinions, detectors) = {
            let ctx = self.context(&history);
            (evaluate_all(&ctx), detect_all(&history, &self.stats))
        };

        self.weights.adjust(&self.performance);
        let Consensus {
            prediction,
            confidence,
            rationale,
            ..
        } = aggregate(
            &opinions.primitives,
            &self.weights,
            self.config.tie_break,
            self.history.last(),
        );

        self.retained = Some(RetainedOpinions {
            generation: self.history.appended(),
            opinions: opinions.clone(),
            detectors: detectors.clone(),
        });

        Prediction {
            prediction,
            confidence,
            rationale,
            opinions,
            weights: self.weights.weights().clone(),
            detectors,
            diagnostics: Diagnostics {
                session_stats: self.stats.clone(),
                market_state: self.market,
                history_len: self.history.len(),
                pattern_count: self.patterns.len(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::models::fixtures::parse;
    use crate::strategy::params::TieBreak;
    use Outcome::{Tai, Xiu};

    fn feed(ensemble: &mut EnsemblePredictor, outcomes: &str) {
        for o in parse(outcomes) {
            ensemble.record_outcome(o);
        }
    }

    #[test]
    fn test_new_validates_config() {
        let bad = EnsembleConfig::default().with_max_history(0);
        assert!(matches!(EnsemblePredictor::new(bad), Err(EnsembleError::Params(_))));
        assert!(EnsemblePredictor::new(EnsembleConfig::default()).is_ok());
    }

    #[test]
    fn test_new_rejects_nan_weight_bound() {
        let mut config = EnsembleConfig::default();
        config.min_weight = f64::NAN;
        assert!(matches!(
            EnsemblePredictor::new(config),
            Err(EnsembleError::Params(ParamsError::InvalidWeightBounds(..)))
        ));
    }

    #[test]
    fn test_record_label() {
        let mut ensemble = EnsemblePredictor::default();
        assert_eq!(ensemble.record_label("Tài").unwrap(), Tai);
        assert_eq!(ensemble.record_label("xiu").unwrap(), Xiu);
        assert!(ensemble.record_label("Không rõ").is_err());
        assert_eq!(ensemble.history().len(), 2);
    }

    #[test]
    fn test_history_bounded() {
        let config = EnsembleConfig::default().with_max_history(20);
        let mut ensemble = EnsemblePredictor::new(config).unwrap();
        for i in 0..50 {
            ensemble.record_outcome(if i % 3 == 0 { Tai } else { Xiu });
        }
        assert_eq!(ensemble.history().len(), 20);
        assert_eq!(ensemble.history().appended(), 50);
    }

    #[test]
    fn test_empty_history_is_undetermined() {
        let mut ensemble = EnsemblePredictor::default();
        let prediction = ensemble.predict_next();
        assert_eq!(prediction.prediction, Tai);
        assert_eq!(prediction.confidence, 0.5);
        assert!(prediction.rationale.starts_with("undetermined"));
    }

    #[test]
    fn test_predict_is_idempotent() {
        let mut ensemble = EnsemblePredictor::default();
        feed(&mut ensemble, "TTXTXXTTTXTXTTXXXTXT");
        let first = ensemble.predict_next();
        let second = ensemble.predict_next();
        assert_eq!(first.prediction, second.prediction);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.opinions, second.opinions);
    }

    #[test]
    fn test_scoring_uses_retained_opinions() {
        let mut ensemble = EnsemblePredictor::default();
        feed(&mut ensemble, "XTTT");
        let prediction = ensemble.predict_next();
        let momentum = prediction.opinions.get(ModelKind::Momentum).unwrap().clone();
        assert_eq!(momentum.prediction, Some(Tai));

        ensemble.score_previous_opinions(Tai);
        let perf = &ensemble.performance()[&ModelKind::Momentum];
        assert_eq!((perf.correct, perf.total), (1, 1));
        // Models without an opinion are not scored
        assert!(!ensemble.performance().contains_key(&ModelKind::Trend));
    }

    #[test]
    fn test_stale_opinions_are_recomputed() {
        let mut ensemble = EnsemblePredictor::default();
        feed(&mut ensemble, "XTTT");
        ensemble.predict_next();
        // Momentum said Tai on XTTT but has no opinion on TTTX
        ensemble.record_outcome(Xiu);
        ensemble.score_previous_opinions(Xiu);
        assert!(!ensemble.performance().contains_key(&ModelKind::Momentum));
    }

    #[test]
    fn test_detector_confidence_adapts() {
        let mut ensemble = EnsemblePredictor::default();
        feed(&mut ensemble, "TXTXT");
        let prediction = ensemble.predict_next();
        assert!(prediction
            .detectors
            .iter()
            .any(|s| s.detector == DetectorKind::Alternating));

        // Alternating said Xiu, Tai came
        ensemble.score_previous_opinions(Tai);
        let reliability = ensemble.stats().detector_confidence("alternating").unwrap();
        assert!((reliability - 0.68 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_weights_within_bounds_over_long_run() {
        let mut ensemble = EnsemblePredictor::default();
        for i in 0..150u32 {
            ensemble.predict_next();
            let outcome = if (i * 7 + i / 5) % 3 == 0 { Tai } else { Xiu };
            ensemble.score_previous_opinions(outcome);
            ensemble.record_outcome(outcome);
        }
        let prediction = ensemble.predict_next();
        for weight in prediction.weights.values() {
            assert!((0.1..=2.0).contains(weight));
        }
        for (_, opinion) in prediction.opinions.iter() {
            assert!((0.0..=0.95).contains(&opinion.confidence));
        }
        assert!((0.0..=1.0).contains(&prediction.confidence));
    }

    #[test]
    fn test_random_tie_break_reaches_both_sides() {
        let config = EnsembleConfig::default().with_tie_break(TieBreak::Random);
        let mut tai = 0;
        for _ in 0..200 {
            let mut ensemble = EnsemblePredictor::new(config.clone()).unwrap();
            if ensemble.predict_next().prediction == Tai {
                tai += 1;
            }
        }
        assert!(tai > 50 && tai < 150, "tai chosen {} of 200", tai);
    }
}

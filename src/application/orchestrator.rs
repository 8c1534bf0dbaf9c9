//! Prediction Orchestrator
//!
//! Drives the ensemble round by round. For every new round it scores the
//! previous opinions, records the outcome and forecasts the next round, all
//! under one lock so concurrent callers are serialised.
//! Rounds at or below the last ingested round number are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{ModelPerformance, Outcome, OutcomeError, RoundRecord};
use crate::ports::{RoundSource, RoundSourceError};
use crate::strategy::{EnsembleConfig, EnsembleError, EnsemblePredictor, ModelKind, Prediction};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Round {round} has no usable result: {source}")]
    InvalidRound {
        round: u64,
        #[source]
        source: OutcomeError,
    },
    #[error("Round number {0} leaves no room for a next round")]
    RoundOutOfRange(u64),
    #[error("Round source error: {0}")]
    SourceError(#[from] RoundSourceError),
    #[error("Ensemble error: {0}")]
    EnsembleError(#[from] EnsembleError),
}

/// Forecast for the round after `previous_round`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundForecast {
    pub previous_round: u64,
    pub next_round: u64,
    pub prediction: Outcome,
    pub confidence: f64,
    /// Confidence formatted as "xx.xx%"
    pub confidence_pct: String,
    pub rationale: String,
    pub generated_at: DateTime<Utc>,
}

impl RoundForecast {
    pub fn new(previous_round: u64, prediction: &Prediction) -> Self {
        Self {
            previous_round,
            next_round: previous_round.saturating_add(1),
            prediction: prediction.prediction,
            confidence: prediction.confidence,
            confidence_pct: format!("{:.2}%", prediction.confidence * 100.0),
            rationale: prediction.rationale.clone(),
            generated_at: Utc::now(),
        }
    }
}

/// Accuracy summary of the session so far
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub rounds_ingested: u64,
    pub last_round: Option<u64>,
    /// Forecasts whose target round has been observed
    pub forecasts_scored: u32,
    pub forecasts_correct: u32,
    pub hit_rate: Option<f64>,
    pub models: BTreeMap<ModelKind, ModelPerformance>,
    pub weights: BTreeMap<ModelKind, f64>,
}

/// Everything guarded by the session lock
struct Session {
    ensemble: EnsemblePredictor,
    last_round: Option<u64>,
    last_forecast: Option<RoundForecast>,
    last_prediction: Option<Prediction>,
    rounds_ingested: u64,
    forecasts_scored: u32,
    forecasts_correct: u32,
}

/// Round-by-round prediction driver
#[derive(Clone)]
pub struct PredictionOrchestrator {
    session: Arc<Mutex<Session>>,
    source: Arc<dyn RoundSource>,
    is_running: Arc<RwLock<bool>>,
    poll_interval: Duration,
}

impl PredictionOrchestrator {
    /// Create new orchestrator
    pub fn new(config: EnsembleConfig, source: Arc<dyn RoundSource>) -> Result<Self, OrchestratorError> {
        let ensemble = EnsemblePredictor::new(config)?;

        Ok(Self {
            session: Arc::new(Mutex::new(Session {
                ensemble,
                last_round: None,
                last_forecast: None,
                last_prediction: None,
                rounds_ingested: 0,
                forecasts_scored: 0,
                forecasts_correct: 0,
            })),
            source,
            is_running: Arc::new(RwLock::new(false)),
            poll_interval: Duration::from_secs(1),
        })
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Feed one finished round. Returns the forecast for the next round, or
    /// `None` when the round was already seen.
    pub async fn ingest(&self, record: RoundRecord) -> Result<Option<RoundForecast>, OrchestratorError> {
        let mut session = self.session.lock().await;

        if let Some(last) = session.last_round {
            if record.round <= last {
                tracing::debug!("Round {} already ingested (last {}), skipping", record.round, last);
                return Ok(None);
            }
        }

        if record.round.checked_add(1).is_none() {
            return Err(OrchestratorError::RoundOutOfRange(record.round));
        }

        let outcome = record.outcome().map_err(|source| OrchestratorError::InvalidRound {
            round: record.round,
            source,
        })?;

        let hit = session
            .last_forecast
            .as_ref()
            .filter(|f| f.next_round == record.round)
            .map(|f| f.prediction == outcome);
        if let Some(correct) = hit {
            session.forecasts_scored += 1;
            if correct {
                session.forecasts_correct += 1;
            }
        }

        session.ensemble.score_previous_opinions(outcome);
        session.ensemble.record_outcome(outcome);
        let prediction = session.ensemble.predict_next();
        let forecast = RoundForecast::new(record.round, &prediction);

        tracing::info!(
            "Round {} → {} | Next {} → {} ({})",
            record.round,
            outcome,
            forecast.next_round,
            forecast.prediction,
            forecast.confidence_pct
        );

        session.last_round = Some(record.round);
        session.rounds_ingested += 1;
        session.last_forecast = Some(forecast.clone());
        session.last_prediction = Some(prediction);

        Ok(Some(forecast))
    }

    /// Poll the source until it is exhausted or `stop` is called.
    ///
    /// `on_forecast` sees every forecast as it is produced. Rounds with an
    /// unusable result are logged and skipped.
    pub async fn run<F>(&self, mut on_forecast: F) -> Result<(), OrchestratorError>
    where
        F: FnMut(&RoundForecast),
    {
        *self.is_running.write().await = true;
        tracing::info!("Starting prediction orchestrator - Poll interval: {:?}", self.poll_interval);

        while *self.is_running.read().await {
            if self.source.is_exhausted() {
                tracing::info!("Round source exhausted");
                break;
            }

            match self.source.next_round().await {
                Ok(Some(record)) => match self.ingest(record).await {
                    Ok(Some(forecast)) => on_forecast(&forecast),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Skipping round: {}", e),
                },
                Ok(None) => tokio::time::sleep(self.poll_interval).await,
                Err(RoundSourceError::Exhausted) => {
                    tracing::info!("Round source exhausted");
                    break;
                }
                Err(e) => {
                    tracing::error!("Round source error: {}", e);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        *self.is_running.write().await = false;
        tracing::info!("Prediction orchestrator stopped");
        Ok(())
    }

    /// Stop the polling loop
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
        tracing::info!("Stop signal sent to orchestrator");
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Forecast produced by the latest ingested round
    pub async fn latest_forecast(&self) -> Option<RoundForecast> {
        self.session.lock().await.last_forecast.clone()
    }

    /// Full prediction (opinions, weights, diagnostics) behind the latest forecast
    pub async fn latest_prediction(&self) -> Option<Prediction> {
        self.session.lock().await.last_prediction.clone()
    }

    pub async fn performance_report(&self) -> PerformanceReport {
        let session = self.session.lock().await;
        let hit_rate = (session.forecasts_scored > 0)
            .then(|| session.forecasts_correct as f64 / session.forecasts_scored as f64);

        PerformanceReport {
            rounds_ingested: session.rounds_ingested,
            last_round: session.last_round,
            forecasts_scored: session.forecasts_scored,
            forecasts_correct: session.forecasts_correct,
            hit_rate,
            models: session.ensemble.performance().clone(),
            weights: session.ensemble.weights().clone(),
        }
    }
}

//! Weight Adjuster
//!
//! Re-weights models by relative accuracy. Weights are only recomputed when
//! accuracies have spread apart: `(max - min) / max` above the threshold.
//! Each weight then becomes `1 + (accuracy - mean) * 2`, clamped.

use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::{ModelPerformance, NEUTRAL_ACCURACY};
use super::params::EnsembleConfig;
use super::registry::{ModelKind, REGISTRY};

const SENSITIVITY: f64 = 2.0;

#[derive(Debug, Clone, Serialize)]
pub struct WeightAdjuster {
    weights: BTreeMap<ModelKind, f64>,
    min_weight: f64,
    max_weight: f64,
    spread_threshold: f64,
}

impl Default for WeightAdjuster {
    fn default() -> Self {
        Self::new(&EnsembleConfig::default())
    }
}

impl WeightAdjuster {
    /// Every registered model at its default weight
    pub fn new(config: &EnsembleConfig) -> Self {
        let weights = REGISTRY
            .iter()
            .map(|d| (d.kind, d.default_weight.clamp(config.min_weight, config.max_weight)))
            .collect();
        Self {
            weights,
            min_weight: config.min_weight,
            max_weight: config.max_weight,
            spread_threshold: config.spread_threshold,
        }
    }

    pub fn weight(&self, kind: ModelKind) -> f64 {
        self.weights.get(&kind).copied().unwrap_or(1.0)
    }

    pub fn weights(&self) -> &BTreeMap<ModelKind, f64> {
        &self.weights
    }

    /// Relative spread of accuracies; 0 when the best accuracy is 0
    pub fn spread(accuracies: &[f64]) -> f64 {
        let max = accuracies.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let min = accuracies.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        if accuracies.is_empty() || max <= 0.0 {
            return 0.0;
        }
        (max - min) / max
    }

    /// Recompute weights from the performance book.
    ///
    /// Returns true when weights changed.
    pub fn adjust(&mut self, performance: &BTreeMap<ModelKind, ModelPerformance>) -> bool {
        let accuracies: Vec<(ModelKind, f64)> = REGISTRY
            .iter()
            .map(|d| {
                let accuracy = performance
                    .get(&d.kind)
                    .map(ModelPerformance::accuracy)
                    .unwrap_or(NEUTRAL_ACCURACY);
                (d.kind, accuracy)
            })
            .collect();

        let values: Vec<f64> = accuracies.iter().map(|(_, a)| *a).collect();
        let spread = Self::spread(&values);
        if spread <= self.spread_threshold {
            return false;
        }

        let mean = values.iter().mean();
        let mut changed = false;
        for (kind, accuracy) in accuracies {
            let weight = (1.0 + (accuracy - mean) * SENSITIVITY).clamp(self.min_weight, self.max_weight);
            let previous = self.weights.insert(kind, weight);
            changed |= previous != Some(weight);
        }
        debug!("Weights recomputed (spread {:.3}, mean accuracy {:.3})", spread, mean);
        changed
    }
}

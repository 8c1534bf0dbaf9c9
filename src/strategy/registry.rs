//! Model Registry
//!
//! Closed list of sub-models. Each descriptor carries the model's evaluation
//! function, its dependency class and its default weight.
//!
//! - **Primitive** models read only history-derived state
//! - **Meta** models read the primitive opinions and nothing else
//!
//! Primitive models are always evaluated before meta models, and meta models
//! never see each other's output.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::models::{
    balancer, mean_reversion, momentum, pattern_match, streak_break, trend, ModelContext,
    ModelOpinion,
};

/// Identifier for every sub-model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    PatternMatch,
    Trend,
    MeanReversion,
    Momentum,
    StreakBreak,
    WeightBalancer,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PatternMatch => "pattern_match",
            Self::Trend => "trend",
            Self::MeanReversion => "mean_reversion",
            Self::Momentum => "momentum",
            Self::StreakBreak => "streak_break",
            Self::WeightBalancer => "weight_balancer",
        }
    }

    pub fn descriptor(&self) -> &'static ModelDescriptor {
        // Registry is indexed in declaration order
        &REGISTRY[*self as usize]
    }

    pub fn class(&self) -> ModelClass {
        self.descriptor().class
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Dependency class of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelClass {
    Primitive,
    Meta,
}

/// How a model is evaluated
#[derive(Clone, Copy)]
pub enum Evaluator {
    Primitive(fn(&ModelContext<'_>) -> ModelOpinion),
    Meta(fn(&[(ModelKind, ModelOpinion)]) -> ModelOpinion),
}

/// Static description of one sub-model
#[derive(Clone, Copy)]
pub struct ModelDescriptor {
    pub kind: ModelKind,
    pub class: ModelClass,
    pub evaluator: Evaluator,
    pub default_weight: f64,
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("kind", &self.kind)
            .field("class", &self.class)
            .field("default_weight", &self.default_weight)
            .finish()
    }
}

pub const REGISTRY: [ModelDescriptor; 6] = [
    ModelDescriptor {
        kind: ModelKind::PatternMatch,
        class: ModelClass::Primitive,
        evaluator: Evaluator::Primitive(pattern_match::evaluate),
        default_weight: 1.0,
    },
    ModelDescriptor {
        kind: ModelKind::Trend,
        class: ModelClass::Primitive,
        evaluator: Evaluator::Primitive(trend::evaluate),
        default_weight: 1.0,
    },
    ModelDescriptor {
        kind: ModelKind::MeanReversion,
        class: ModelClass::Primitive,
        evaluator: Evaluator::Primitive(mean_reversion::evaluate),
        default_weight: 1.0,
    },
    ModelDescriptor {
        kind: ModelKind::Momentum,
        class: ModelClass::Primitive,
        evaluator: Evaluator::Primitive(momentum::evaluate),
        default_weight: 1.0,
    },
    ModelDescriptor {
        kind: ModelKind::StreakBreak,
        class: ModelClass::Primitive,
        evaluator: Evaluator::Primitive(streak_break::evaluate),
        default_weight: 1.0,
    },
    ModelDescriptor {
        kind: ModelKind::WeightBalancer,
        class: ModelClass::Meta,
        evaluator: Evaluator::Meta(balancer::evaluate),
        default_weight: 1.0,
    },
];

/// Opinions of every registered model, primitives first, in registry order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpinionSet {
    pub primitives: Vec<(ModelKind, ModelOpinion)>,
    pub meta: Vec<(ModelKind, ModelOpinion)>,
}

impl OpinionSet {
    pub fn iter(&self) -> impl Iterator<Item = &(ModelKind, ModelOpinion)> {
        self.primitives.iter().chain(self.meta.iter())
    }

    pub fn get(&self, kind: ModelKind) -> Option<&ModelOpinion> {
        self.iter().find(|(k, _)| *k == kind).map(|(_, o)| o)
    }
}

/// Run every registered model against `ctx`
pub fn evaluate_all(ctx: &ModelContext<'_>) -> OpinionSet {
    let primitives: Vec<_> = REGISTRY
        .iter()
        .filter_map(|d| match d.evaluator {
            Evaluator::Primitive(f) => Some((d.kind, f(ctx))),
            Evaluator::Meta(_) => None,
        })
        .collect();

    let meta = REGISTRY
        .iter()
        .filter_map(|d| match d.evaluator {
            Evaluator::Meta(f) => Some((d.kind, f(&primitives))),
            Evaluator::Primitive(_) => None,
        })
        .collect();

    OpinionSet { primitives, meta }
}

//! Strategy Layer - Adaptive Ensemble Prediction
//!
//! Combines independent heuristic sub-models into one next-round forecast:
//! - Pattern database seeded with fixed templates and mined online
//! - Primitive sub-models (pattern match, trend, mean reversion, momentum,
//!   streak break) and one meta model (weight balancer)
//! - Accuracy-driven weight adjustment and weighted consensus
//! - Advanced pattern detectors reported alongside the forecast
//!
//! `EnsemblePredictor` owns all of it.

pub mod params;
pub mod pattern_db;
pub mod models;
pub mod registry;
pub mod detectors;
pub mod weights;
pub mod aggregator;
pub mod ensemble;

pub use params::{EnsembleConfig, ParamsError, TieBreak};
pub use pattern_db::{PatternDatabase, PatternEntry, PatternOrigin, SEED_COUNT};
pub use models::{ModelContext, ModelOpinion, MAX_CONFIDENCE};
pub use registry::{evaluate_all, ModelClass, ModelDescriptor, ModelKind, OpinionSet, REGISTRY};
pub use detectors::{detect_all, DetectorKind, DetectorSignal};
pub use weights::WeightAdjuster;
pub use aggregator::{aggregate, Consensus};
pub use ensemble::{Diagnostics, EnsembleError, EnsemblePredictor, Prediction};

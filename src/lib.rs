//! Taixiu Oracle - Adaptive Ensemble Predictor Library
//!
//! Forecasts binary Tai/Xiu round outcomes by combining independent heuristic
//! models, an online-mined pattern database and accuracy-driven reweighting.
//!
//! # Modules
//!
//! - `domain`: Outcomes, round records, history, session statistics, regimes
//! - `ports`: Trait abstractions (RoundSource)
//! - `strategy`: Sub-models, pattern mining, weighting and consensus (EnsemblePredictor)
//! - `adapters`: External implementations (round file replay, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Prediction orchestrator

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;

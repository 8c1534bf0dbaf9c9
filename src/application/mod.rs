pub mod orchestrator;

pub use orchestrator::{
    OrchestratorError, PerformanceReport, PredictionOrchestrator, RoundForecast,
};

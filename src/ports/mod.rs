//! Ports Layer - Trait definitions for external dependencies
//!
//! Adapters implement these to feed the orchestrator:
//! - Round sources (replayed files, live feeds)

pub mod round_source;

pub use round_source::{RoundSource, RoundSourceError};

#[cfg(test)]
pub use round_source::MockRoundSource;

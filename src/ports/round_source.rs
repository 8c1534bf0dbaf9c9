//! Round Source Port
//!
//! Supplies finished rounds to the orchestrator, one at a time.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::RoundRecord;

/// Round source error type
#[derive(Error, Debug)]
pub enum RoundSourceError {
    #[error("Round feed I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Round feed parse error: {0}")]
    Parse(String),

    #[error("Round feed exhausted")]
    Exhausted,
}

impl From<serde_json::Error> for RoundSourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Source of finished rounds
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoundSource: Send + Sync {
    /// Next finished round, `None` when nothing new is available yet
    async fn next_round(&self) -> Result<Option<RoundRecord>, RoundSourceError>;

    /// True once the source will never yield another round
    fn is_exhausted(&self) -> bool {
        false
    }
}

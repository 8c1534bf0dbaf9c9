//! File-backed round source
//!
//! Replays rounds from a JSON feed in the order they appear. The feed is either
//! an array of round records or a single record object.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use tokio::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::domain::RoundRecord;
use crate::ports::{RoundSource, RoundSourceError};

#[derive(Deserialize)]
#[serde(untagged)]
enum RoundFeed {
    Many(Vec<RoundRecord>),
    One(RoundRecord),
}

impl From<RoundFeed> for Vec<RoundRecord> {
    fn from(feed: RoundFeed) -> Self {
        match feed {
            RoundFeed::Many(records) => records,
            RoundFeed::One(record) => vec![record],
        }
    }
}

/// Replays a fixed list of rounds
pub struct RoundFileSource {
    pending: Mutex<VecDeque<RoundRecord>>,
    exhausted: AtomicBool,
}

impl RoundFileSource {
    pub fn from_records(records: Vec<RoundRecord>) -> Self {
        let exhausted = AtomicBool::new(records.is_empty());
        Self {
            pending: Mutex::new(records.into()),
            exhausted,
        }
    }

    /// Parse a JSON feed (array or single object)
    pub fn from_json_str(json: &str) -> Result<Self, RoundSourceError> {
        let feed: RoundFeed = serde_json::from_str(json)?;
        let records: Vec<RoundRecord> = feed.into();
        debug!("Parsed {} rounds from feed", records.len());
        Ok(Self::from_records(records))
    }

    /// Load a JSON feed from disk; `~` is expanded
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, RoundSourceError> {
        let raw = path.as_ref().to_string_lossy();
        let expanded = shellexpand::tilde(&raw).into_owned();
        let contents = tokio::fs::read_to_string(&expanded).await?;
        let source = Self::from_json_str(&contents)?;
        info!("Loaded round feed from {}", expanded);
        Ok(source)
    }

    /// Rounds not yet handed out
    pub async fn remaining(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[async_trait]
impl RoundSource for RoundFileSource {
    async fn next_round(&self) -> Result<Option<RoundRecord>, RoundSourceError> {
        let mut pending = self.pending.lock().await;
        let next = pending.pop_front();
        if pending.is_empty() {
            self.exhausted.store(true, Ordering::SeqCst);
        }
        match next {
            Some(record) => Ok(Some(record)),
            None => Err(RoundSourceError::Exhausted),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::SeqCst)
    }
}

//! Domain Layer - Core state of the Tai/Xiu ensemble
//!
//! Pure data types and their update rules, with no I/O:
//! - `outcome`: the two-valued round result and label parsing
//! - `round`: normalised round records as published by feeds
//! - `history`: bounded outcome log
//! - `session_stats`: streaks, transitions, volatility, detector confidence
//! - `market_state`: trend / momentum / stability / regime classification
//! - `performance`: per-model correctness bookkeeping

pub mod outcome;
pub mod round;
pub mod history;
pub mod session_stats;
pub mod market_state;
pub mod performance;

pub use outcome::{encode, Outcome, OutcomeError};
pub use round::{RoundRecord, UNKNOWN_RESULT};
pub use history::{alternations, side_counts, tail_streak, OutcomeHistory, DEFAULT_MAX_HISTORY};
pub use session_stats::{PerSide, SessionStats};
pub use market_state::{MarketState, Regime, Trend, MARKET_WINDOW};
pub use performance::{ModelPerformance, NEUTRAL_ACCURACY};

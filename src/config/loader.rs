//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching default.toml.
//! Every section is optional; missing keys take the ensemble defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::strategy::params::{EnsembleConfig, TieBreak};

/// Environment override for the round feed path
pub const HISTORY_ENV: &str = "TAIXIU_HISTORY";

/// Main configuration structure matching default.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub history: HistorySection,
    #[serde(default)]
    pub patterns: PatternsSection,
    #[serde(default)]
    pub weights: WeightsSection,
    #[serde(default)]
    pub streak_break: StreakBreakSection,
    #[serde(default)]
    pub consensus: ConsensusSection,
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Outcome history section
#[derive(Debug, Clone, Deserialize)]
pub struct HistorySection {
    /// Maximum outcomes kept (oldest evicted first)
    #[serde(default = "default_max_len")]
    pub max_len: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self { max_len: default_max_len() }
    }
}

fn default_max_len() -> usize {
    EnsembleConfig::default().max_history
}

/// Pattern database section
#[derive(Debug, Clone, Deserialize)]
pub struct PatternsSection {
    /// Shortest mined pattern
    #[serde(default = "default_min_pattern_len")]
    pub min_len: usize,
    /// Longest mined pattern
    #[serde(default = "default_max_pattern_len")]
    pub max_len: usize,
    /// Bound on database size; unset keeps every mined pattern
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl Default for PatternsSection {
    fn default() -> Self {
        Self {
            min_len: default_min_pattern_len(),
            max_len: default_max_pattern_len(),
            capacity: None,
        }
    }
}

fn default_min_pattern_len() -> usize {
    EnsembleConfig::default().min_pattern_len
}

fn default_max_pattern_len() -> usize {
    EnsembleConfig::default().max_pattern_len
}

/// Model weight section
#[derive(Debug, Clone, Deserialize)]
pub struct WeightsSection {
    #[serde(default = "default_min_weight")]
    pub min: f64,
    #[serde(default = "default_max_weight")]
    pub max: f64,
    /// Accuracy spread that triggers re-weighting
    #[serde(default = "default_spread_threshold")]
    pub spread_threshold: f64,
}

impl Default for WeightsSection {
    fn default() -> Self {
        Self {
            min: default_min_weight(),
            max: default_max_weight(),
            spread_threshold: default_spread_threshold(),
        }
    }
}

fn default_min_weight() -> f64 {
    EnsembleConfig::default().min_weight
}

fn default_max_weight() -> f64 {
    EnsembleConfig::default().max_weight
}

fn default_spread_threshold() -> f64 {
    EnsembleConfig::default().spread_threshold
}

/// Streak-break section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreakBreakSection {
    /// Fixed break probability; estimated from history when unset
    #[serde(default)]
    pub break_probability: Option<f64>,
}

/// Consensus section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsensusSection {
    /// "reversal" (deterministic) or "random"
    #[serde(default)]
    pub tie_break: TieBreak,
}

/// Round feed section
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSection {
    /// JSON round feed to replay
    #[serde(default)]
    pub input: Option<String>,
    /// Delay between polls when the source has nothing new
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            input: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl FeedSection {
    /// Feed path with environment variable override.
    /// Checks TAIXIU_HISTORY first, falls back to the config value; `~` is expanded.
    pub fn get_input_path(&self) -> Option<PathBuf> {
        std::env::var(HISTORY_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .or_else(|| self.input.clone())
            .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()))
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file; `~` is expanded
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let raw = path.as_ref().to_string_lossy();
    let expanded = shellexpand::tilde(&raw).into_owned();
    let content = std::fs::read_to_string(expanded)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging level must be one of {:?}, got {}",
                LOG_LEVELS, self.logging.level
            )));
        }

        // Ensemble parameters carry their own checks
        EnsembleConfig::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

// Conversion from Config to EnsembleConfig
impl From<&Config> for EnsembleConfig {
    fn from(config: &Config) -> Self {
        EnsembleConfig {
            max_history: config.history.max_len,
            min_pattern_len: config.patterns.min_len,
            max_pattern_len: config.patterns.max_len,
            pattern_capacity: config.patterns.capacity,
            min_weight: config.weights.min,
            max_weight: config.weights.max,
            spread_threshold: config.weights.spread_threshold,
            break_probability: config.streak_break.break_probability,
            tie_break: config.consensus.tie_break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[history]
max_len = 150

[patterns]
min_len = 3
max_len = 7
capacity = 500

[weights]
min = 0.2
max = 1.8
spread_threshold = 0.25

[streak_break]
break_probability = 0.75

[consensus]
tie_break = "random"

[feed]
input = "data/rounds.json"
poll_interval_ms = 500

[logging]
level = "info"
"#
        .to_string()
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.history.max_len, 150);
        assert_eq!(config.patterns.capacity, Some(500));
        assert_eq!(config.consensus.tie_break, TieBreak::Random);
        assert_eq!(config.feed.poll_interval_ms, 500);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        let ensemble = EnsembleConfig::from(&config);
        let defaults = EnsembleConfig::default();

        assert_eq!(ensemble.max_history, defaults.max_history);
        assert_eq!(ensemble.min_pattern_len, 3);
        assert_eq!(ensemble.max_pattern_len, 8);
        assert_eq!(ensemble.pattern_capacity, None);
        assert_eq!(ensemble.break_probability, None);
        assert_eq!(ensemble.tie_break, TieBreak::Reversal);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_conversion_to_ensemble_config() {
        let config = parse_config(&create_valid_config()).unwrap();
        let ensemble = EnsembleConfig::from(&config);

        assert_eq!(ensemble.max_history, 150);
        assert_eq!(ensemble.max_pattern_len, 7);
        assert_eq!(ensemble.min_weight, 0.2);
        assert_eq!(ensemble.max_weight, 1.8);
        assert_eq!(ensemble.spread_threshold, 0.25);
        assert_eq!(ensemble.break_probability, Some(0.75));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let result = parse_config("[history\nmax_len = 10");
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_invalid_break_probability() {
        let result = parse_config("[streak_break]\nbreak_probability = 1.5\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_invalid_tie_break() {
        let result = parse_config("[consensus]\ntie_break = \"coin\"\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_invalid_log_level() {
        let result = parse_config("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_nan_weight_settings_rejected() {
        for content in [
            "[weights]\nmin = nan\n",
            "[weights]\nmax = nan\n",
            "[weights]\nspread_threshold = nan\n",
            "[weights]\nmax = inf\n",
        ] {
            let result = parse_config(content);
            assert!(
                matches!(result, Err(ConfigError::ValidationError(_))),
                "accepted {:?}",
                content
            );
        }
    }

    #[test]
    fn test_pattern_lengths_outside_range_rejected() {
        let result = parse_config("[patterns]\nmin_len = 2\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
        let result = parse_config("[patterns]\nmax_len = 12\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_pattern_capacity_must_hold_seeds() {
        let result = parse_config("[patterns]\ncapacity = 4\n");
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }
}

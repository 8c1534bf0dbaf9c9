//! CLI Commands
//!
//! Argument definitions for the `taixiu` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Environment override for the configuration file path
pub const CONFIG_ENV: &str = "TAIXIU_CONFIG";

/// Default configuration file, used when present
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Taixiu - adaptive ensemble predictor for Tai/Xiu rounds
#[derive(Parser, Debug)]
#[command(
    name = "taixiu",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Adaptive ensemble predictor for Tai/Xiu round outcomes",
    long_about = "Replays recorded rounds through an ensemble of pattern, trend, \
                  mean-reversion, momentum and streak-break models whose weights \
                  follow their observed accuracy, and forecasts the next round."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a round feed, printing a forecast after every round
    Replay(ReplayCmd),

    /// Ingest a whole round feed and print the final forecast as JSON
    Predict(PredictCmd),

    /// Validate a configuration file
    CheckConfig(CheckConfigCmd),
}

/// Replay a round feed
#[derive(Parser, Debug)]
pub struct ReplayCmd {
    /// JSON round feed (array or single record); falls back to TAIXIU_HISTORY
    /// and then `[feed].input`
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Path to configuration file; falls back to TAIXIU_CONFIG
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print forecasts as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Forecast after a whole feed
#[derive(Parser, Debug)]
pub struct PredictCmd {
    /// JSON round feed (array or single record); falls back to TAIXIU_HISTORY
    /// and then `[feed].input`
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Path to configuration file; falls back to TAIXIU_CONFIG
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Include model opinions, weights and diagnostics
    #[arg(long)]
    pub detailed: bool,
}

/// Validate configuration
#[derive(Parser, Debug)]
pub struct CheckConfigCmd {
    /// Path to configuration file; falls back to TAIXIU_CONFIG
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Configuration path from the flag, then TAIXIU_CONFIG, then the default
/// file when it exists
pub fn resolve_config_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| {
        std::env::var(CONFIG_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    })
    .or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        default.exists().then_some(default)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let app = CliApp::parse_from(["taixiu", "-v", "replay", "--input", "rounds.json", "--json"]);
        assert!(app.verbose);
        match app.command {
            Command::Replay(cmd) => {
                assert_eq!(cmd.input, Some(PathBuf::from("rounds.json")));
                assert!(cmd.json);
                assert!(cmd.config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_check_config() {
        let app = CliApp::parse_from(["taixiu", "check-config", "-c", "custom.toml", "--debug"]);
        assert!(app.debug);
        assert!(matches!(app.command, Command::CheckConfig(_)));
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let path = resolve_config_path(Some(PathBuf::from("mine.toml")));
        assert_eq!(path, Some(PathBuf::from("mine.toml")));
    }
}

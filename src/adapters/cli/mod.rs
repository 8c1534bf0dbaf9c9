//! CLI Adapter
//!
//! Command-line interface for the taixiu predictor.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    resolve_config_path, CheckConfigCmd, CliApp, Command, PredictCmd, ReplayCmd, CONFIG_ENV,
    DEFAULT_CONFIG_PATH,
};

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

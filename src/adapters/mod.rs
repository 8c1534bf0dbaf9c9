//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Round File: JSON round feed replay
//! - CLI: Command-line interface definitions

pub mod cli;
pub mod round_file;

pub use cli::CliApp;
pub use round_file::RoundFileSource;

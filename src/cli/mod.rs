//! CLI module
//!
//! Command-line interface for running connectors.
//!
//! # Commands
//!
//! - `spec` - Show the configuration the connector needs
//! - `check` - Validate configuration and manifest offline
//! - `streams` - List stream names
//! - `list` - List built-in connectors
//! - `read` - Extract data from streams

mod commands;
mod runner;

pub use commands::{parse_stream_list, Cli, Commands, OutputFormat};
pub use runner::Runner;

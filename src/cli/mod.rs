//! Command-line interface for agentprobe.
//!
//! Provides commands for running scenarios, benchmarking tools and listing
//! available scenarios.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};

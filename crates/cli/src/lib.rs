//! RAMP Leaderboard CLI Library
//!
//! This library provides the core functionality of the `ramp-leaderboard`
//! command-line interface: user preferences, the leaderboard commands and
//! output formatting.

pub mod commands;
pub mod config;
pub mod output;

pub use config::Config;
pub use output::{JsonFormatter, OutputFormat, PlainFormatter, TableFormatter};

/// Re-export common types
pub use anyhow::{Context, Result};

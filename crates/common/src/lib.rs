//! Common utilities shared by the RAMP leaderboard crates.
//!
//! This crate provides foundational utilities used across the workspace:
//! - Configuration management (settings file, environment, overrides)
//! - Telemetry setup
//! - Fingerprints and checksums
//! - DateTime parsing and display

pub mod config;
pub mod crypto;
pub mod datetime;
pub mod telemetry;

// Re-export commonly used types
pub use config::{LeaderboardSettings, SettingsOverrides};
pub use crypto::{fingerprint, fingerprint_json, ChecksumVerifier};
pub use datetime::{format_datetime, format_datetime_display, parse_datetime};
pub use telemetry::{init_tracing, LogFormat};

/// Common error type used throughout the crate
pub type Result<T> = std::result::Result<T, anyhow::Error>;

//! RAMP Leaderboard Domain Types
//!
//! This crate provides the core domain model of the leaderboard engine: metric
//! definitions, raw fold records, combined scores, ranked entries and the
//! assembled leaderboard, together with the error hierarchy shared by every
//! layer.
//!
//! ## Architecture
//!
//! - **identifiers**: Strongly-typed submission and metric identifiers
//! - **metric**: Metric direction, valid range, combination strategy, metric sets
//! - **score**: Raw fold records and combined scores
//! - **ranking**: Ranking configuration, tie policy, ranked entries
//! - **leaderboard**: Submission metadata, diagnostics, the final leaderboard
//! - **config**: The configuration bundle handed to the engine
//! - **errors**: Record, ranking, metadata and configuration errors
//! - **serialization**: Serde helpers for NaN score sentinels
//!
//! ## Usage
//!
//! ```rust
//! use ramp_leaderboard_domain::{
//!     metric::{Direction, MetricDefinition, MetricSet},
//!     score::ScoreRecord,
//! };
//!
//! let accuracy = MetricDefinition::new("accuracy".parse().unwrap(), Direction::HigherIsBetter, 3)
//!     .with_tolerance(0.001);
//! let metrics = MetricSet::new(vec![accuracy]).unwrap();
//! assert_eq!(metrics.len(), 1);
//!
//! let record = ScoreRecord::valid("starting_kit".parse().unwrap(), "accuracy".parse().unwrap(), 0, 0.9);
//! assert!(record.is_valid);
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod errors;
pub mod identifiers;
pub mod leaderboard;
pub mod metric;
pub mod ranking;
pub mod score;
pub mod serialization;

// Re-export commonly used types
pub use config::LeaderboardConfig;
pub use errors::{
    ConfigError, IdentifierError, LeaderboardError, LeaderboardResult, RankingError, RecordError,
};
pub use identifiers::{MetricId, SubmissionId};
pub use leaderboard::{
    Diagnostic, Leaderboard, LeaderboardRow, MetadataLookup, MissingMetadataPolicy,
    SubmissionMetadata,
};
pub use metric::{BagWeighting, CombinationStrategy, Direction, MetricDefinition, MetricRange, MetricSet};
pub use ranking::{RankedEntry, RankingConfig, SubmissionScores, TiePolicy};
pub use score::{CombinedScore, ScoreRecord};

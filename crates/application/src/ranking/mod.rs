//! Ranking module - orders combined scores into a leaderboard sequence
//!
//! Ranking applies completeness, direction, tolerance-based tie groups and
//! the configured tie policy to the combined scores of every submission.

mod ranker;

pub use ranker::*;

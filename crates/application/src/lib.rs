//! Application layer of the RAMP leaderboard engine
//!
//! This crate turns raw fold records into a ranked leaderboard.
//!
//! ## Architecture
//!
//! ```text
//! records -> ScoreStore -> Combiner -> Ranker -> assembler -> Leaderboard
//! ```
//!
//! ## Modules
//!
//! - `store` - Validated storage of raw fold records
//! - `scoring` - Combination strategies and the combiner
//! - `ranking` - Ordering, tie groups and rank assignment
//! - `assembler` - Metadata join producing the final leaderboard
//! - `engine` - The `compute_leaderboard` entry point
//! - `fingerprint` - Cache keys over the engine inputs

pub mod assembler;
pub mod engine;
pub mod fingerprint;
pub mod ranking;
pub mod scoring;
pub mod store;

// Re-export commonly used types
pub use engine::{compute_leaderboard, validate_records};
pub use fingerprint::leaderboard_fingerprint;
pub use ranking::Ranker;
pub use scoring::{combine_folds, Combiner};
pub use store::{IngestionReport, ScoreStore};

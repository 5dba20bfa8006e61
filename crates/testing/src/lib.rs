//! Testing utilities for the RAMP leaderboard engine
//!
//! This crate provides:
//! - Test fixtures for the reference scoring scenarios
//! - Builder patterns for records, configurations and metadata
//! - Property-based testing strategies
//!
//! # Examples
//!
//! ```
//! use ramp_leaderboard_testing::{builders::*, fixtures::*};
//!
//! let config = create_accuracy_config();
//! let records = RecordsBuilder::new()
//!     .valid_folds("A", "accuracy", &[0.90, 0.91, 0.89])
//!     .build();
//! assert_eq!(records.len(), 3);
//! assert_eq!(config.metrics.len(), 1);
//! ```

pub mod builders;
pub mod fixtures;
pub mod strategies;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;

// Re-export testing dependencies for convenience
pub use fake;
pub use proptest;

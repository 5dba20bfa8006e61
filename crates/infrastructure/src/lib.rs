//! Infrastructure layer for the RAMP leaderboard
//!
//! This crate provides implementations for:
//! - Score record loading (CSV, JSON, JSON Lines)
//! - RAMP kit directories (`submissions/<name>/training_output/fold_<i>/scores.csv`)
//! - The submission metadata registry
//! - Leaderboard caching (in-memory and filesystem)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ramp_leaderboard_infrastructure::{load_input, MetadataRegistry};
//!
//! let input = load_input(Path::new("kit"), &config.metrics, "valid")?;
//! let metadata = input.metadata.unwrap_or_default();
//! ```

pub mod cache;
pub mod loaders;
pub mod registry;

// Re-export commonly used types
pub use cache::{FsLeaderboardCache, InMemoryLeaderboardCache, LeaderboardCache};
pub use loaders::{load_input, load_ramp_kit, load_records, LoadedInput, ParsedRecords, RecordFormat};
pub use registry::MetadataRegistry;

use std::path::PathBuf;

// Re-export result and error types
pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure-level errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem errors, with the path involved
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV reader errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input that could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// File type without a loader
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Resource not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),
}

impl Error {
    /// Whether the error came from the input rather than the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::Csv(_)
                | Error::Serialization(_)
                | Error::Parse(_)
                | Error::UnsupportedFormat(_)
                | Error::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::Parse("bad".into()).is_input_error());
        assert!(!Error::Cache("locked".into()).is_input_error());
        let io = Error::Io {
            path: PathBuf::from("/tmp/x"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(!io.is_input_error());
        assert!(io.to_string().contains("/tmp/x"));
    }
}

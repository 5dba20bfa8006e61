//! Error types for the leaderboard domain.
//!
//! The hierarchy mirrors the three failure classes of a leaderboard
//! computation: record-level rejections that never abort a run
//! ([`RecordError`]), structural inconsistencies that are fatal to the current
//! run ([`RankingError`]), and missing submission metadata. Configuration
//! mistakes are reported through [`ConfigError`] before any record is read.

use crate::identifiers::{MetricId, SubmissionId};

/// Top-level leaderboard error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LeaderboardError {
    /// A score record was rejected
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] RecordError),

    /// Ranking could not be performed
    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    /// A ranked submission has no metadata and the policy is to fail
    #[error("Missing metadata for submission {submission_id}")]
    MissingMetadata {
        /// The submission without a registry entry
        submission_id: SubmissionId,
    },

    /// The metric configuration is invalid
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl LeaderboardError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRecord(_) => "INVALID_RECORD",
            Self::Ranking(_) => "RANKING_ERROR",
            Self::MissingMetadata { .. } => "MISSING_METADATA",
            Self::Config(_) => "INVALID_CONFIG",
        }
    }

    /// Whether the error aborts the leaderboard computation.
    ///
    /// Record rejections are collected and reported; everything else is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidRecord(_))
    }

    /// The submission the error is about, if any
    pub fn submission_id(&self) -> Option<&SubmissionId> {
        match self {
            Self::InvalidRecord(e) => e.submission_id(),
            Self::Ranking(e) => e.submission_id(),
            Self::MissingMetadata { submission_id } => Some(submission_id),
            Self::Config(_) => None,
        }
    }

    /// The metric the error is about, if any
    pub fn metric_id(&self) -> Option<&MetricId> {
        match self {
            Self::InvalidRecord(e) => e.metric_id(),
            Self::Ranking(e) => e.metric_id(),
            Self::MissingMetadata { .. } => None,
            Self::Config(e) => e.metric_id(),
        }
    }
}

/// Reasons a score record is rejected at ingestion
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// The record references a metric that is not configured
    #[error("unknown metric '{metric_id}' for submission {submission_id}")]
    UnknownMetric {
        submission_id: SubmissionId,
        metric_id: MetricId,
    },

    /// The fold index is outside `0..n_folds`
    #[error("fold {fold_index} out of range for metric '{metric_id}' ({n_folds} folds) in submission {submission_id}")]
    FoldOutOfRange {
        submission_id: SubmissionId,
        metric_id: MetricId,
        fold_index: u32,
        n_folds: u32,
    },

    /// A record for the same (submission, metric, fold) was already accepted
    #[error("duplicate record for submission {submission_id}, metric '{metric_id}', fold {fold_index}")]
    DuplicateRecord {
        submission_id: SubmissionId,
        metric_id: MetricId,
        fold_index: u32,
    },

    /// A record marked valid carries NaN or an infinite value
    #[error("non-finite value for submission {submission_id}, metric '{metric_id}', fold {fold_index}")]
    NonFiniteValue {
        submission_id: SubmissionId,
        metric_id: MetricId,
        fold_index: u32,
    },

    /// A valid value lies outside the metric's declared range
    #[error("value {value} outside [{min}, {max}] for submission {submission_id}, metric '{metric_id}', fold {fold_index}")]
    ValueOutOfRange {
        submission_id: SubmissionId,
        metric_id: MetricId,
        fold_index: u32,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Raw input that could not be turned into a record at all
    #[error("malformed input at {location}: {message}")]
    Malformed { location: String, message: String },
}

impl RecordError {
    /// Machine-readable error code shared by all record rejections
    pub fn error_code(&self) -> &'static str {
        "INVALID_RECORD"
    }

    /// Short snake_case name of the rejection reason
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownMetric { .. } => "unknown_metric",
            Self::FoldOutOfRange { .. } => "fold_out_of_range",
            Self::DuplicateRecord { .. } => "duplicate_record",
            Self::NonFiniteValue { .. } => "non_finite_value",
            Self::ValueOutOfRange { .. } => "value_out_of_range",
            Self::Malformed { .. } => "malformed",
        }
    }

    pub fn submission_id(&self) -> Option<&SubmissionId> {
        match self {
            Self::UnknownMetric { submission_id, .. }
            | Self::FoldOutOfRange { submission_id, .. }
            | Self::DuplicateRecord { submission_id, .. }
            | Self::NonFiniteValue { submission_id, .. }
            | Self::ValueOutOfRange { submission_id, .. } => Some(submission_id),
            Self::Malformed { .. } => None,
        }
    }

    pub fn metric_id(&self) -> Option<&MetricId> {
        match self {
            Self::UnknownMetric { metric_id, .. }
            | Self::FoldOutOfRange { metric_id, .. }
            | Self::DuplicateRecord { metric_id, .. }
            | Self::NonFiniteValue { metric_id, .. }
            | Self::ValueOutOfRange { metric_id, .. } => Some(metric_id),
            Self::Malformed { .. } => None,
        }
    }
}

/// Structural inconsistencies detected while ranking
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankingError {
    /// Two entries share the same submission id
    #[error("duplicate submission id: {0}")]
    DuplicateSubmission(SubmissionId),

    /// The primary metric is not part of the metric configuration
    #[error("primary metric '{0}' is not configured")]
    PrimaryMetricNotConfigured(MetricId),

    /// The secondary metric is not part of the metric configuration
    #[error("secondary metric '{0}' is not configured")]
    SecondaryMetricNotConfigured(MetricId),

    /// The secondary metric repeats the primary one
    #[error("secondary metric '{0}' must differ from the primary metric")]
    SecondaryEqualsPrimary(MetricId),

    /// An entry carries no combined score for a ranking metric
    #[error("submission {submission_id} has no combined score for metric '{metric_id}'")]
    MissingScore {
        submission_id: SubmissionId,
        metric_id: MetricId,
    },
}

impl RankingError {
    pub fn submission_id(&self) -> Option<&SubmissionId> {
        match self {
            Self::DuplicateSubmission(id) => Some(id),
            Self::MissingScore { submission_id, .. } => Some(submission_id),
            _ => None,
        }
    }

    pub fn metric_id(&self) -> Option<&MetricId> {
        match self {
            Self::PrimaryMetricNotConfigured(id)
            | Self::SecondaryMetricNotConfigured(id)
            | Self::SecondaryEqualsPrimary(id) => Some(id),
            Self::MissingScore { metric_id, .. } => Some(metric_id),
            Self::DuplicateSubmission(_) => None,
        }
    }
}

/// Invalid metric configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// No metric was declared
    #[error("at least one metric must be configured")]
    NoMetrics,

    /// The same metric id was declared twice
    #[error("metric '{0}' is declared more than once")]
    DuplicateMetric(MetricId),

    /// A metric declares zero folds
    #[error("metric '{0}' must have at least one fold")]
    InvalidFoldCount(MetricId),

    /// A tie tolerance is negative or not finite
    #[error("metric '{metric_id}' has invalid tolerance {tolerance}")]
    InvalidTolerance { metric_id: MetricId, tolerance: f64 },

    /// A value range is empty, inverted or not finite
    #[error("metric '{metric_id}' has invalid range [{min}, {max}]")]
    InvalidRange {
        metric_id: MetricId,
        min: f64,
        max: f64,
    },

    /// Explicit bagging weights are negative or not finite
    #[error("metric '{metric_id}' has invalid bagging weights: {message}")]
    InvalidWeights { metric_id: MetricId, message: String },

    /// An identifier in the configuration is malformed
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}

impl ConfigError {
    pub fn metric_id(&self) -> Option<&MetricId> {
        match self {
            Self::DuplicateMetric(id) | Self::InvalidFoldCount(id) => Some(id),
            Self::InvalidTolerance { metric_id, .. }
            | Self::InvalidRange { metric_id, .. }
            | Self::InvalidWeights { metric_id, .. } => Some(metric_id),
            Self::NoMetrics | Self::Identifier(_) => None,
        }
    }
}

/// Malformed identifiers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// Empty or whitespace-only identifier
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },

    /// Identifier containing control characters
    #[error("{kind} contains control characters: \"{value}\"")]
    ControlCharacter { kind: &'static str, value: String },
}

/// Leaderboard-wide result type
pub type LeaderboardResult<T> = Result<T, LeaderboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(s: &str) -> SubmissionId {
        s.parse().unwrap()
    }

    fn metric(s: &str) -> MetricId {
        s.parse().unwrap()
    }

    #[test]
    fn test_error_codes() {
        let err = LeaderboardError::from(RecordError::DuplicateRecord {
            submission_id: sub("a"),
            metric_id: metric("acc"),
            fold_index: 0,
        });
        assert_eq!(err.error_code(), "INVALID_RECORD");
        assert!(!err.is_fatal());

        let err = LeaderboardError::from(RankingError::DuplicateSubmission(sub("a")));
        assert_eq!(err.error_code(), "RANKING_ERROR");
        assert!(err.is_fatal());

        let err = LeaderboardError::MissingMetadata {
            submission_id: sub("a"),
        };
        assert_eq!(err.error_code(), "MISSING_METADATA");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_offending_ids_are_exposed() {
        let err = LeaderboardError::from(RecordError::FoldOutOfRange {
            submission_id: sub("kit"),
            metric_id: metric("acc"),
            fold_index: 7,
            n_folds: 3,
        });
        assert_eq!(err.submission_id().map(|s| s.as_str()), Some("kit"));
        assert_eq!(err.metric_id().map(|m| m.as_str()), Some("acc"));
        assert!(err.to_string().contains("fold 7"));
    }

    #[test]
    fn test_record_error_kind() {
        let err = RecordError::Malformed {
            location: "scores.csv:4".to_string(),
            message: "bad float".to_string(),
        };
        assert_eq!(err.kind(), "malformed");
        assert!(err.submission_id().is_none());
    }
}

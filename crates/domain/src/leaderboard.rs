//! The assembled leaderboard and submission metadata.

use crate::errors::{LeaderboardError, RecordError};
use crate::identifiers::{MetricId, SubmissionId};
use crate::ranking::{RankedEntry, TiePolicy};
use crate::score::CombinedScore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Display metadata of a submission, supplied by the submission registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub display_name: String,
}

impl SubmissionMetadata {
    pub fn new(
        author: impl Into<String>,
        timestamp: Option<DateTime<Utc>>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            timestamp,
            display_name: display_name.into(),
        }
    }

    /// Stand-in metadata for a submission the registry does not know
    pub fn placeholder(submission_id: &SubmissionId) -> Self {
        Self {
            author: "unknown".to_string(),
            timestamp: None,
            display_name: submission_id.to_string(),
        }
    }
}

/// Lookup of submission metadata by id
pub trait MetadataLookup {
    fn lookup(&self, submission_id: &SubmissionId) -> Option<SubmissionMetadata>;
}

impl MetadataLookup for HashMap<SubmissionId, SubmissionMetadata> {
    fn lookup(&self, submission_id: &SubmissionId) -> Option<SubmissionMetadata> {
        self.get(submission_id).cloned()
    }
}

impl MetadataLookup for BTreeMap<SubmissionId, SubmissionMetadata> {
    fn lookup(&self, submission_id: &SubmissionId) -> Option<SubmissionMetadata> {
        self.get(submission_id).cloned()
    }
}

impl<T: MetadataLookup + ?Sized> MetadataLookup for &T {
    fn lookup(&self, submission_id: &SubmissionId) -> Option<SubmissionMetadata> {
        (**self).lookup(submission_id)
    }
}

/// What to do with a ranked submission that has no metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMetadataPolicy {
    /// Abort the computation with `MissingMetadata`
    #[default]
    Fail,
    /// Emit the row with placeholder metadata and a diagnostic
    Placeholder,
}

/// A reported, non-fatal problem found while building a leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Machine-readable error code
    pub code: String,
    /// Short reason, e.g. `duplicate_record`
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<SubmissionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_id: Option<MetricId>,
    pub message: String,
}

impl From<&RecordError> for Diagnostic {
    fn from(error: &RecordError) -> Self {
        Self {
            code: error.error_code().to_string(),
            kind: error.kind().to_string(),
            submission_id: error.submission_id().cloned(),
            metric_id: error.metric_id().cloned(),
            message: error.to_string(),
        }
    }
}

impl Diagnostic {
    /// The diagnostic recorded when placeholder metadata is used
    pub fn missing_metadata(submission_id: &SubmissionId) -> Self {
        let error = LeaderboardError::MissingMetadata {
            submission_id: submission_id.clone(),
        };
        Self {
            code: error.error_code().to_string(),
            kind: "placeholder_metadata".to_string(),
            submission_id: Some(submission_id.clone()),
            metric_id: None,
            message: error.to_string(),
        }
    }
}

/// One row of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub tie_group_id: u32,
    pub submission_id: SubmissionId,
    pub metadata: SubmissionMetadata,
    /// Set when `metadata` is a placeholder
    #[serde(default)]
    pub metadata_missing: bool,
    pub is_complete: bool,
    pub scores: BTreeMap<MetricId, CombinedScore>,
}

impl LeaderboardRow {
    pub fn from_entry(entry: RankedEntry, metadata: SubmissionMetadata, metadata_missing: bool) -> Self {
        Self {
            rank: entry.rank,
            tie_group_id: entry.tie_group_id,
            submission_id: entry.submission_id,
            metadata,
            metadata_missing,
            is_complete: entry.is_complete,
            scores: entry.combined_scores,
        }
    }

    pub fn score(&self, metric: &MetricId) -> Option<&CombinedScore> {
        self.scores.get(metric)
    }
}

/// The final ranked, metadata-joined leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub primary_metric: MetricId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_metric: Option<MetricId>,
    pub tie_policy: TiePolicy,
    /// Metric ids in display order: primary first, then the rest by id
    pub metrics: Vec<MetricId>,
    pub rows: Vec<LeaderboardRow>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Leaderboard {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, submission_id: &SubmissionId) -> Option<&LeaderboardRow> {
        self.rows.iter().find(|r| &r.submission_id == submission_id)
    }

    /// Submission ids in rank order
    pub fn submission_ids(&self) -> impl Iterator<Item = &SubmissionId> {
        self.rows.iter().map(|r| &r.submission_id)
    }

    pub fn complete_rows(&self) -> impl Iterator<Item = &LeaderboardRow> {
        self.rows.iter().filter(|r| r.is_complete)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

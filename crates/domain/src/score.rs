//! Raw fold observations and the combined scores derived from them.

use crate::identifiers::{MetricId, SubmissionId};
use serde::{Deserialize, Serialize};

/// One fold observation of one metric for one submission.
///
/// Missing or failed folds are kept as records with `is_valid = false` so
/// that fold accounting stays exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub submission_id: SubmissionId,
    pub metric_id: MetricId,
    /// 0-based fold (or resample) index
    pub fold_index: u32,
    #[serde(with = "crate::serialization::nan_as_null")]
    pub value: f64,
    #[serde(default = "default_valid")]
    pub is_valid: bool,
}

fn default_valid() -> bool {
    true
}

impl ScoreRecord {
    /// A record carrying a measured value
    pub fn valid(
        submission_id: SubmissionId,
        metric_id: MetricId,
        fold_index: u32,
        value: f64,
    ) -> Self {
        Self {
            submission_id,
            metric_id,
            fold_index,
            value,
            is_valid: true,
        }
    }

    /// A record for a fold that produced no usable value
    pub fn invalid(submission_id: SubmissionId, metric_id: MetricId, fold_index: u32) -> Self {
        Self {
            submission_id,
            metric_id,
            fold_index,
            value: f64::NAN,
            is_valid: false,
        }
    }
}

/// The single score a submission obtains for a metric after combining its folds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedScore {
    pub submission_id: SubmissionId,
    pub metric_id: MetricId,
    /// Combined value, NaN when no fold was valid
    #[serde(with = "crate::serialization::nan_as_null")]
    pub value: f64,
    pub n_folds_used: u32,
    pub n_folds_expected: u32,
    pub is_complete: bool,
    /// Sample standard deviation of the valid folds, NaN when none
    #[serde(with = "crate::serialization::nan_as_null")]
    pub std_dev: f64,
}

impl CombinedScore {
    /// The score of a submission without any valid fold
    pub fn empty(submission_id: SubmissionId, metric_id: MetricId, n_folds_expected: u32) -> Self {
        Self {
            submission_id,
            metric_id,
            value: f64::NAN,
            n_folds_used: 0,
            n_folds_expected,
            is_complete: false,
            std_dev: f64::NAN,
        }
    }

    /// Whether at least one valid fold contributed
    pub fn has_value(&self) -> bool {
        !self.value.is_nan()
    }
}

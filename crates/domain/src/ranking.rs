//! Ranking configuration and ranked entries.

use crate::identifiers::{MetricId, SubmissionId};
use crate::score::CombinedScore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How ranks are assigned inside a tie group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// Every entry gets its own rank, following the tie-break chain
    #[default]
    Distinct,
    /// All members of a tie group share the rank of the group's first position
    Shared,
}

/// Which metrics order the leaderboard, and how ties are ranked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    pub primary_metric: MetricId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_metric: Option<MetricId>,
    #[serde(default)]
    pub tie_policy: TiePolicy,
}

impl RankingConfig {
    pub fn new(primary_metric: MetricId) -> Self {
        Self {
            primary_metric,
            secondary_metric: None,
            tie_policy: TiePolicy::default(),
        }
    }

    pub fn with_secondary(mut self, metric: MetricId) -> Self {
        self.secondary_metric = Some(metric);
        self
    }

    pub fn with_tie_policy(mut self, policy: TiePolicy) -> Self {
        self.tie_policy = policy;
        self
    }
}

/// All combined scores of one submission, the unit the ranker orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionScores {
    pub submission_id: SubmissionId,
    pub scores: BTreeMap<MetricId, CombinedScore>,
}

impl SubmissionScores {
    pub fn new(submission_id: SubmissionId) -> Self {
        Self {
            submission_id,
            scores: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, score: CombinedScore) {
        self.scores.insert(score.metric_id.clone(), score);
    }

    pub fn get(&self, metric: &MetricId) -> Option<&CombinedScore> {
        self.scores.get(metric)
    }
}

/// A submission placed on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub submission_id: SubmissionId,
    /// 1-based rank
    pub rank: u32,
    /// 1-based tie group, contiguous in leaderboard order
    pub tie_group_id: u32,
    /// Completeness of the primary metric
    pub is_complete: bool,
    pub combined_scores: BTreeMap<MetricId, CombinedScore>,
}

impl RankedEntry {
    pub fn score(&self, metric: &MetricId) -> Option<&CombinedScore> {
        self.combined_scores.get(metric)
    }
}

//! Leaderboard configuration as seen by the engine.

use crate::leaderboard::MissingMetadataPolicy;
use crate::metric::MetricSet;
use crate::ranking::RankingConfig;
use serde::{Deserialize, Serialize};

/// Everything the engine needs besides records and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    pub metrics: MetricSet,
    pub ranking: RankingConfig,
    #[serde(default)]
    pub missing_metadata: MissingMetadataPolicy,
}

impl LeaderboardConfig {
    pub fn new(metrics: MetricSet, ranking: RankingConfig) -> Self {
        Self {
            metrics,
            ranking,
            missing_metadata: MissingMetadataPolicy::default(),
        }
    }

    pub fn with_missing_metadata(mut self, policy: MissingMetadataPolicy) -> Self {
        self.missing_metadata = policy;
        self
    }
}

//! Fluent builder pattern for constructing test data.
//!
//! This module provides builders for record sequences, leaderboard
//! configurations and metadata registries.

use ramp_leaderboard_domain::{
    CombinationStrategy, Direction, LeaderboardConfig, MetricDefinition, MetricId, MetricSet,
    MissingMetadataPolicy, RankingConfig, ScoreRecord, SubmissionId, SubmissionMetadata,
    TiePolicy,
};
use std::collections::BTreeMap;

/// Parse an id in test code
pub fn id<T>(value: &str) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Debug,
{
    value.parse().expect("valid test identifier")
}

/// Builder for sequences of score records
#[derive(Clone, Default)]
pub struct RecordsBuilder {
    records: Vec<ScoreRecord>,
}

impl RecordsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record per value, fold `i` for the `i`-th value.
    ///
    /// `None` becomes an invalid record for that fold.
    pub fn folds(mut self, submission: &str, metric: &str, values: &[Option<f64>]) -> Self {
        for (fold, value) in values.iter().enumerate() {
            let record = match value {
                Some(v) => ScoreRecord::valid(id(submission), id(metric), fold as u32, *v),
                None => ScoreRecord::invalid(id(submission), id(metric), fold as u32),
            };
            self.records.push(record);
        }
        self
    }

    /// Add valid records for every value
    pub fn valid_folds(self, submission: &str, metric: &str, values: &[f64]) -> Self {
        let values: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        self.folds(submission, metric, &values)
    }

    pub fn record(mut self, record: ScoreRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn reversed(mut self) -> Self {
        self.records.reverse();
        self
    }

    pub fn build(self) -> Vec<ScoreRecord> {
        self.records
    }
}

/// Builder for leaderboard configurations
#[derive(Clone)]
pub struct LeaderboardConfigBuilder {
    metrics: Vec<MetricDefinition>,
    primary: Option<MetricId>,
    secondary: Option<MetricId>,
    tie_policy: TiePolicy,
    missing_metadata: MissingMetadataPolicy,
}

impl LeaderboardConfigBuilder {
    pub fn new() -> Self {
        Self {
            metrics: Vec::new(),
            primary: None,
            secondary: None,
            tie_policy: TiePolicy::Distinct,
            missing_metadata: MissingMetadataPolicy::Fail,
        }
    }

    pub fn with_metric(mut self, definition: MetricDefinition) -> Self {
        self.metrics.push(definition);
        self
    }

    /// Add a mean-combined metric
    pub fn with_simple_metric(self, metric: &str, direction: Direction, n_folds: u32, tolerance: f64) -> Self {
        self.with_metric(
            MetricDefinition::new(id(metric), direction, n_folds)
                .with_strategy(CombinationStrategy::Mean)
                .with_tolerance(tolerance),
        )
    }

    pub fn with_primary(mut self, metric: &str) -> Self {
        self.primary = Some(id(metric));
        self
    }

    pub fn with_secondary(mut self, metric: &str) -> Self {
        self.secondary = Some(id(metric));
        self
    }

    pub fn shared_ranks(mut self) -> Self {
        self.tie_policy = TiePolicy::Shared;
        self
    }

    pub fn placeholder_metadata(mut self) -> Self {
        self.missing_metadata = MissingMetadataPolicy::Placeholder;
        self
    }

    /// Build the configuration.
    ///
    /// The primary metric defaults to the first metric added.
    pub fn build(self) -> LeaderboardConfig {
        let primary = self
            .primary
            .or_else(|| self.metrics.first().map(|m| m.id.clone()))
            .expect("at least one metric");
        let metrics = MetricSet::new(self.metrics).expect("valid test metrics");

        let mut ranking = RankingConfig::new(primary).with_tie_policy(self.tie_policy);
        if let Some(secondary) = self.secondary {
            ranking = ranking.with_secondary(secondary);
        }

        LeaderboardConfig::new(metrics, ranking).with_missing_metadata(self.missing_metadata)
    }
}

impl Default for LeaderboardConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for metadata registries
#[derive(Clone, Default)]
pub struct MetadataBuilder {
    entries: BTreeMap<SubmissionId, SubmissionMetadata>,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, submission: &str, author: &str, display_name: &str) -> Self {
        self.entries.insert(
            id(submission),
            SubmissionMetadata::new(author, None, display_name),
        );
        self
    }

    /// Metadata with generated author names for every submission
    pub fn for_submissions(mut self, submissions: &[&str]) -> Self {
        for submission in submissions {
            self.entries
                .insert(id(submission), crate::fixtures::create_test_metadata(submission));
        }
        self
    }

    pub fn build(self) -> BTreeMap<SubmissionId, SubmissionMetadata> {
        self.entries
    }
}

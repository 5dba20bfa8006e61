//! Test fixtures for the leaderboard engine.
//!
//! This module provides the reference scenarios (accuracy over three folds)
//! and metadata with realistic author names.

use crate::builders::{id, LeaderboardConfigBuilder, MetadataBuilder, RecordsBuilder};
use chrono::{TimeZone, Utc};
use fake::{faker::name::en::Name, Fake};
use ramp_leaderboard_domain::{
    Direction, LeaderboardConfig, MetricDefinition, ScoreRecord, SubmissionId, SubmissionMetadata,
};
use std::collections::BTreeMap;

/// `accuracy`: higher is better, mean of 3 folds, tolerance 0.001
pub fn accuracy_metric() -> MetricDefinition {
    MetricDefinition::new(id("accuracy"), Direction::HigherIsBetter, 3)
        .with_tolerance(0.001)
        .with_range(0.0, 1.0)
}

/// `nll`: lower is better, mean of 3 folds, exact ties only
pub fn nll_metric() -> MetricDefinition {
    MetricDefinition::new(id("nll"), Direction::LowerIsBetter, 3)
}

/// Accuracy-ranked configuration with `nll` as secondary metric
pub fn create_test_config() -> LeaderboardConfig {
    LeaderboardConfigBuilder::new()
        .with_metric(accuracy_metric())
        .with_metric(nll_metric())
        .with_primary("accuracy")
        .with_secondary("nll")
        .build()
}

/// Accuracy-only configuration
pub fn create_accuracy_config() -> LeaderboardConfig {
    LeaderboardConfigBuilder::new()
        .with_metric(accuracy_metric())
        .build()
}

/// A: [0.90, 0.91, 0.89], B: [0.80, 0.82, 0.81]
pub fn scenario_ab_records() -> Vec<ScoreRecord> {
    RecordsBuilder::new()
        .valid_folds("A", "accuracy", &[0.90, 0.91, 0.89])
        .valid_folds("B", "accuracy", &[0.80, 0.82, 0.81])
        .build()
}

/// Scenario A/B plus C: [0.95, invalid, 0.94]
pub fn scenario_abc_records() -> Vec<ScoreRecord> {
    let mut records = scenario_ab_records();
    records.extend(
        RecordsBuilder::new()
            .folds("C", "accuracy", &[Some(0.95), None, Some(0.94)])
            .build(),
    );
    records
}

/// Two submissions whose accuracy differs by less than the tolerance
pub fn scenario_tie_records() -> Vec<ScoreRecord> {
    RecordsBuilder::new()
        .valid_folds("X", "accuracy", &[0.8004, 0.8004, 0.8004])
        .valid_folds("Y", "accuracy", &[0.8001, 0.8001, 0.8001])
        .build()
}

/// Metadata for a submission with a generated author
pub fn create_test_metadata(submission: &str) -> SubmissionMetadata {
    SubmissionMetadata::new(
        Name().fake::<String>(),
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).single(),
        submission,
    )
}

/// Metadata for the scenario submissions A, B, C, X and Y
pub fn scenario_metadata() -> BTreeMap<SubmissionId, SubmissionMetadata> {
    MetadataBuilder::new()
        .with("A", "alice", "Submission A")
        .with("B", "bob", "Submission B")
        .with("C", "carol", "Submission C")
        .with("X", "xavier", "Submission X")
        .with("Y", "yvonne", "Submission Y")
        .build()
}

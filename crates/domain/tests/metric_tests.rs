//! Tests for metric definitions and configuration validation
//!
//! Tests direction ordering, combination strategy serialization and the
//! validation rules of metric sets.

use proptest::prelude::*;
use ramp_leaderboard_domain::{
    errors::ConfigError,
    metric::{BagWeighting, CombinationStrategy, Direction, MetricDefinition, MetricSet},
    MetricId,
};
use std::cmp::Ordering;

fn metric(id: &str) -> MetricId {
    id.parse().unwrap()
}

// ============================================================================
// Direction Tests
// ============================================================================

#[test]
fn test_higher_is_better_orders_descending() {
    let mut values = vec![0.2, 0.9, 0.5];
    values.sort_by(|a, b| Direction::HigherIsBetter.compare(*a, *b));
    assert_eq!(values, vec![0.9, 0.5, 0.2]);
}

#[test]
fn test_lower_is_better_orders_ascending() {
    let mut values = vec![0.2, 0.9, 0.5];
    values.sort_by(|a, b| Direction::LowerIsBetter.compare(*a, *b));
    assert_eq!(values, vec![0.2, 0.5, 0.9]);
}

#[test]
fn test_nan_sorts_last_in_both_directions() {
    for direction in [Direction::HigherIsBetter, Direction::LowerIsBetter] {
        assert_eq!(direction.compare(f64::NAN, 0.0), Ordering::Greater);
        assert_eq!(direction.compare(0.0, f64::NAN), Ordering::Less);
        assert_eq!(direction.compare(f64::NAN, f64::NAN), Ordering::Equal);
    }
}

#[test]
fn test_best_ignores_nan() {
    assert_eq!(Direction::HigherIsBetter.best(f64::NAN, 0.3), 0.3);
    assert_eq!(Direction::LowerIsBetter.best(0.3, 0.1), 0.1);
}

// ============================================================================
// Strategy Serialization Tests
// ============================================================================

#[test]
fn test_strategy_is_tagged_by_type() {
    let strategy: CombinationStrategy =
        serde_json::from_str(r#"{"type":"bagged","weighting":{"type":"cumulative"}}"#).unwrap();
    assert_eq!(
        strategy,
        CombinationStrategy::Bagged {
            weighting: BagWeighting::Cumulative
        }
    );

    let best: CombinationStrategy = serde_json::from_str(r#"{"type":"best_of_k"}"#).unwrap();
    assert_eq!(best, CombinationStrategy::BestOfK);
}

#[test]
fn test_bagged_weighting_defaults_to_uniform() {
    let strategy: CombinationStrategy = serde_json::from_str(r#"{"type":"bagged"}"#).unwrap();
    assert_eq!(
        strategy,
        CombinationStrategy::Bagged {
            weighting: BagWeighting::Uniform
        }
    );
}

#[test]
fn test_explicit_weights_default_to_one_past_the_list() {
    let weighting = BagWeighting::Explicit {
        weights: vec![0.5, 2.0],
    };
    assert_eq!(weighting.weight(0), 0.5);
    assert_eq!(weighting.weight(1), 2.0);
    assert_eq!(weighting.weight(7), 1.0);
    assert_eq!(BagWeighting::Cumulative.weight(2), 3.0);
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_zero_folds_rejected() {
    let definition = MetricDefinition::new(metric("acc"), Direction::HigherIsBetter, 0);
    assert!(matches!(
        definition.validate(),
        Err(ConfigError::InvalidFoldCount(_))
    ));
}

#[test]
fn test_negative_tolerance_rejected() {
    let definition =
        MetricDefinition::new(metric("acc"), Direction::HigherIsBetter, 3).with_tolerance(-0.1);
    assert!(matches!(
        definition.validate(),
        Err(ConfigError::InvalidTolerance { .. })
    ));
}

#[test]
fn test_inverted_range_rejected() {
    let definition =
        MetricDefinition::new(metric("acc"), Direction::HigherIsBetter, 3).with_range(1.0, 0.0);
    assert!(matches!(
        definition.validate(),
        Err(ConfigError::InvalidRange { .. })
    ));
}

#[test]
fn test_negative_bag_weight_rejected() {
    let definition = MetricDefinition::new(metric("acc"), Direction::HigherIsBetter, 3)
        .with_strategy(CombinationStrategy::Bagged {
            weighting: BagWeighting::Explicit {
                weights: vec![1.0, -1.0],
            },
        });
    assert!(matches!(
        definition.validate(),
        Err(ConfigError::InvalidWeights { .. })
    ));
}

#[test]
fn test_metric_set_rejects_duplicates_and_empty() {
    assert!(matches!(
        MetricSet::new(Vec::new()),
        Err(ConfigError::NoMetrics)
    ));

    let duplicate = MetricSet::new(vec![
        MetricDefinition::new(metric("acc"), Direction::HigherIsBetter, 3),
        MetricDefinition::new(metric("acc"), Direction::LowerIsBetter, 5),
    ]);
    assert!(matches!(duplicate, Err(ConfigError::DuplicateMetric(_))));
}

#[test]
fn test_metric_set_iterates_by_id() {
    let set = MetricSet::new(vec![
        MetricDefinition::new(metric("nll"), Direction::LowerIsBetter, 3),
        MetricDefinition::new(metric("acc"), Direction::HigherIsBetter, 3),
    ])
    .unwrap();

    let ids: Vec<&str> = set.ids().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["acc", "nll"]);
}

#[test]
fn test_metric_set_deserialization_validates() {
    let result: Result<MetricSet, _> = serde_json::from_str(
        r#"[{"id":"acc","direction":"higher_is_better","n_folds":0}]"#,
    );
    assert!(result.is_err());
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_compare_is_antisymmetric(a in -1e6f64..1e6, b in -1e6f64..1e6) {
        for direction in [Direction::HigherIsBetter, Direction::LowerIsBetter] {
            prop_assert_eq!(direction.compare(a, b), direction.compare(b, a).reverse());
        }
    }
}

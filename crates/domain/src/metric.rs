//! Metric definitions and combination strategies.

use crate::errors::ConfigError;
use crate::identifiers::MetricId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Whether larger or smaller values of a metric are better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    pub fn higher_is_better(self) -> bool {
        matches!(self, Self::HigherIsBetter)
    }

    /// Order two values best-first.
    ///
    /// NaN sorts after every number and equal to itself, so the result is a
    /// total order usable with `sort_by`.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match self {
                Self::HigherIsBetter => b.total_cmp(&a),
                Self::LowerIsBetter => a.total_cmp(&b),
            },
        }
    }

    /// The better of two values; NaN loses against any number
    pub fn best(self, a: f64, b: f64) -> f64 {
        match self.compare(a, b) {
            Ordering::Greater => b,
            _ => a,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::HigherIsBetter => "higher is better",
            Self::LowerIsBetter => "lower is better",
        }
    }
}

/// Inclusive range of valid metric values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// How fold observations of one metric are reduced to a single score
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombinationStrategy {
    /// Arithmetic mean of valid folds
    #[default]
    Mean,
    /// Best valid fold in the metric's direction
    BestOfK,
    /// Median of valid folds
    Median,
    /// Weighted mean with weights derived from the fold index
    Bagged {
        #[serde(default)]
        weighting: BagWeighting,
    },
}

impl CombinationStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::BestOfK => "best_of_k",
            Self::Median => "median",
            Self::Bagged { .. } => "bagged",
        }
    }
}

/// Per-fold weights of the bagged strategy.
///
/// Weights are keyed by fold index, never by the position a record arrived
/// in, so permuting the input folds cannot change a bagged score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BagWeighting {
    /// Every fold weighs 1
    #[default]
    Uniform,
    /// Fold `i` weighs `i + 1`
    Cumulative,
    /// Configured weight per fold index; folds past the list weigh 1
    Explicit { weights: Vec<f64> },
}

impl BagWeighting {
    pub fn weight(&self, fold_index: u32) -> f64 {
        match self {
            Self::Uniform => 1.0,
            Self::Cumulative => f64::from(fold_index) + 1.0,
            Self::Explicit { weights } => weights.get(fold_index as usize).copied().unwrap_or(1.0),
        }
    }
}

/// A metric as configured for one leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub id: MetricId,
    pub direction: Direction,
    #[serde(default)]
    pub strategy: CombinationStrategy,
    /// Number of folds every complete submission reports
    pub n_folds: u32,
    /// Absolute epsilon under which two combined scores are tied
    #[serde(default)]
    pub tolerance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<MetricRange>,
}

impl MetricDefinition {
    /// A mean-combined metric with zero tolerance and no range
    pub fn new(id: MetricId, direction: Direction, n_folds: u32) -> Self {
        Self {
            id,
            direction,
            strategy: CombinationStrategy::Mean,
            n_folds,
            tolerance: 0.0,
            range: None,
        }
    }

    pub fn with_strategy(mut self, strategy: CombinationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some(MetricRange::new(min, max));
        self
    }

    /// Check the definition for values no computation can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_folds == 0 {
            return Err(ConfigError::InvalidFoldCount(self.id.clone()));
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance {
                metric_id: self.id.clone(),
                tolerance: self.tolerance,
            });
        }

        if let Some(range) = &self.range {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(ConfigError::InvalidRange {
                    metric_id: self.id.clone(),
                    min: range.min,
                    max: range.max,
                });
            }
        }

        if let CombinationStrategy::Bagged {
            weighting: BagWeighting::Explicit { weights },
        } = &self.strategy
        {
            if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(ConfigError::InvalidWeights {
                    metric_id: self.id.clone(),
                    message: format!("weight {} is negative or not finite", bad),
                });
            }
        }

        Ok(())
    }
}

/// The validated set of metrics of one leaderboard, keyed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MetricDefinition>", into = "Vec<MetricDefinition>")]
pub struct MetricSet {
    metrics: BTreeMap<MetricId, MetricDefinition>,
}

impl MetricSet {
    /// Build a metric set, validating every definition.
    ///
    /// Fails on an empty set, a duplicate id or an invalid definition.
    pub fn new(definitions: impl IntoIterator<Item = MetricDefinition>) -> Result<Self, ConfigError> {
        let mut metrics = BTreeMap::new();
        for definition in definitions {
            definition.validate()?;
            if metrics.contains_key(&definition.id) {
                return Err(ConfigError::DuplicateMetric(definition.id));
            }
            metrics.insert(definition.id.clone(), definition);
        }

        if metrics.is_empty() {
            return Err(ConfigError::NoMetrics);
        }

        Ok(Self { metrics })
    }

    pub fn get(&self, id: &MetricId) -> Option<&MetricDefinition> {
        self.metrics.get(id)
    }

    pub fn contains(&self, id: &MetricId) -> bool {
        self.metrics.contains_key(id)
    }

    /// Definitions in metric-id order
    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.metrics.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &MetricId> {
        self.metrics.keys()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl TryFrom<Vec<MetricDefinition>> for MetricSet {
    type Error = ConfigError;

    fn try_from(definitions: Vec<MetricDefinition>) -> Result<Self, Self::Error> {
        Self::new(definitions)
    }
}

impl From<MetricSet> for Vec<MetricDefinition> {
    fn from(set: MetricSet) -> Self {
        set.metrics.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> MetricId {
        s.parse().unwrap()
    }

    #[test]
    fn test_direction_compare_orders_best_first() {
        let mut values = vec![0.2, f64::NAN, 0.9, 0.5];
        values.sort_by(|a, b| Direction::HigherIsBetter.compare(*a, *b));
        assert_eq!(&values[..3], &[0.9, 0.5, 0.2]);
        assert!(values[3].is_nan());

        let mut values = vec![0.2, f64::NAN, 0.9, 0.5];
        values.sort_by(|a, b| Direction::LowerIsBetter.compare(*a, *b));
        assert_eq!(&values[..3], &[0.2, 0.5, 0.9]);
        assert!(values[3].is_nan());
    }

    #[test]
    fn test_direction_best() {
        assert_eq!(Direction::HigherIsBetter.best(0.3, 0.7), 0.7);
        assert_eq!(Direction::LowerIsBetter.best(0.3, 0.7), 0.3);
        assert_eq!(Direction::LowerIsBetter.best(f64::NAN, 0.7), 0.7);
    }

    #[test]
    fn test_bag_weights_by_fold_index() {
        assert_eq!(BagWeighting::Uniform.weight(4), 1.0);
        assert_eq!(BagWeighting::Cumulative.weight(0), 1.0);
        assert_eq!(BagWeighting::Cumulative.weight(2), 3.0);

        let explicit = BagWeighting::Explicit {
            weights: vec![0.5, 2.0],
        };
        assert_eq!(explicit.weight(1), 2.0);
        assert_eq!(explicit.weight(5), 1.0);
    }

    #[test]
    fn test_validate_rejects_zero_folds() {
        let metric = MetricDefinition::new(id("acc"), Direction::HigherIsBetter, 0);
        assert_eq!(metric.validate(), Err(ConfigError::InvalidFoldCount(id("acc"))));
    }

    #[test]
    fn test_validate_rejects_negative_tolerance() {
        let metric =
            MetricDefinition::new(id("acc"), Direction::HigherIsBetter, 3).with_tolerance(-0.1);
        assert!(matches!(
            metric.validate(),
            Err(ConfigError::InvalidTolerance { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let metric =
            MetricDefinition::new(id("acc"), Direction::HigherIsBetter, 3).with_range(1.0, 0.0);
        assert!(matches!(metric.validate(), Err(ConfigError::InvalidRange { .. })));
    }

    #[test]
    fn test_validate_rejects_negative_weights() {
        let metric = MetricDefinition::new(id("nll"), Direction::LowerIsBetter, 2).with_strategy(
            CombinationStrategy::Bagged {
                weighting: BagWeighting::Explicit {
                    weights: vec![1.0, -1.0],
                },
            },
        );
        assert!(matches!(
            metric.validate(),
            Err(ConfigError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn test_metric_set_rejects_duplicates_and_empty() {
        let acc = MetricDefinition::new(id("acc"), Direction::HigherIsBetter, 3);
        assert_eq!(
            MetricSet::new(vec![acc.clone(), acc]),
            Err(ConfigError::DuplicateMetric(id("acc")))
        );
        assert_eq!(MetricSet::new(Vec::new()), Err(ConfigError::NoMetrics));
    }

    #[test]
    fn test_metric_set_iterates_in_id_order() {
        let set = MetricSet::new(vec![
            MetricDefinition::new(id("nll"), Direction::LowerIsBetter, 3),
            MetricDefinition::new(id("acc"), Direction::HigherIsBetter, 3),
        ])
        .unwrap();
        let ids: Vec<&str> = set.ids().map(|m| m.as_str()).collect();
        assert_eq!(ids, vec!["acc", "nll"]);
    }

    #[test]
    fn test_strategy_deserialization() {
        let strategy: CombinationStrategy =
            serde_json::from_str(r#"{"type":"bagged","weighting":{"type":"cumulative"}}"#).unwrap();
        assert_eq!(
            strategy,
            CombinationStrategy::Bagged {
                weighting: BagWeighting::Cumulative
            }
        );

        let strategy: CombinationStrategy = serde_json::from_str(r#"{"type":"bagged"}"#).unwrap();
        assert_eq!(
            strategy,
            CombinationStrategy::Bagged {
                weighting: BagWeighting::Uniform
            }
        );
    }
}

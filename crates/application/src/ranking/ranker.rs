//! Ranker - ordering, tie groups and rank assignment
//!
//! Entries are ordered by the chain
//!
//! 1. completeness of the primary metric (complete first),
//! 2. primary value in the metric's direction (NaN last),
//! 3. inside a tie group: secondary metric, then submission id.
//!
//! A tie group is anchored at its best entry and takes every following entry
//! within the primary metric's tolerance of that anchor.

use ramp_leaderboard_domain::{
    Direction, MetricDefinition, MetricSet, RankedEntry, RankingConfig, RankingError,
    SubmissionScores, TiePolicy,
};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// An entry with the keys the ordering chain needs, extracted once
#[derive(Debug)]
struct Candidate {
    scores: SubmissionScores,
    complete: bool,
    primary: f64,
    secondary: f64,
}

/// Orders combined submission scores into ranked entries
#[derive(Debug, Clone)]
pub struct Ranker<'a> {
    primary: &'a MetricDefinition,
    secondary: Option<&'a MetricDefinition>,
    tie_policy: TiePolicy,
}

impl<'a> Ranker<'a> {
    /// Resolve the configured metrics, failing when either is unknown or
    /// when the secondary metric repeats the primary one.
    pub fn new(metrics: &'a MetricSet, config: &RankingConfig) -> Result<Self, RankingError> {
        let primary = metrics
            .get(&config.primary_metric)
            .ok_or_else(|| RankingError::PrimaryMetricNotConfigured(config.primary_metric.clone()))?;

        let secondary = match &config.secondary_metric {
            Some(id) if id == &config.primary_metric => {
                return Err(RankingError::SecondaryEqualsPrimary(id.clone()));
            }
            Some(id) => Some(
                metrics
                    .get(id)
                    .ok_or_else(|| RankingError::SecondaryMetricNotConfigured(id.clone()))?,
            ),
            None => None,
        };

        Ok(Self {
            primary,
            secondary,
            tie_policy: config.tie_policy,
        })
    }

    pub fn tie_policy(&self) -> TiePolicy {
        self.tie_policy
    }

    /// Rank a set of submissions.
    ///
    /// Fails when a submission appears twice or lacks a primary score.
    #[instrument(skip_all, fields(entries = entries.len(), primary = %self.primary.id))]
    pub fn rank(&self, entries: Vec<SubmissionScores>) -> Result<Vec<RankedEntry>, RankingError> {
        let mut seen = BTreeSet::new();
        let mut candidates = Vec::with_capacity(entries.len());
        for scores in entries {
            if !seen.insert(scores.submission_id.clone()) {
                return Err(RankingError::DuplicateSubmission(scores.submission_id));
            }
            candidates.push(self.candidate(scores)?);
        }

        let direction = self.primary.direction;
        candidates.sort_by(|a, b| {
            b.complete
                .cmp(&a.complete)
                .then_with(|| direction.compare(a.primary, b.primary))
                .then_with(|| a.scores.submission_id.cmp(&b.scores.submission_id))
        });

        let groups = self.tie_groups(candidates);
        let ranked = self.assign_ranks(groups);

        debug!(
            ranked = ranked.len(),
            groups = ranked.last().map(|e| e.tie_group_id).unwrap_or(0),
            "Ranked submissions"
        );
        Ok(ranked)
    }

    fn candidate(&self, scores: SubmissionScores) -> Result<Candidate, RankingError> {
        let primary = scores
            .get(&self.primary.id)
            .ok_or_else(|| RankingError::MissingScore {
                submission_id: scores.submission_id.clone(),
                metric_id: self.primary.id.clone(),
            })?;
        let complete = primary.is_complete;
        let primary = primary.value;

        let secondary = self
            .secondary
            .and_then(|metric| scores.get(&metric.id))
            .map(|s| s.value)
            .unwrap_or(f64::NAN);

        Ok(Candidate {
            scores,
            complete,
            primary,
            secondary,
        })
    }

    /// Split sorted candidates into tie groups and order each group
    fn tie_groups(&self, sorted: Vec<Candidate>) -> Vec<Vec<Candidate>> {
        let epsilon = self.primary.tolerance;
        let mut groups: Vec<Vec<Candidate>> = Vec::new();

        for candidate in sorted {
            let joins = groups
                .last()
                .and_then(|group| group.first())
                .map(|anchor| within_tolerance(anchor, &candidate, epsilon))
                .unwrap_or(false);

            match groups.last_mut() {
                Some(group) if joins => group.push(candidate),
                _ => groups.push(vec![candidate]),
            }
        }

        let secondary = self.secondary.map(|m| m.direction);
        for group in &mut groups {
            group.sort_by(|a, b| break_tie(secondary, a, b));
        }
        groups
    }

    fn assign_ranks(&self, groups: Vec<Vec<Candidate>>) -> Vec<RankedEntry> {
        let mut ranked = Vec::new();
        let mut position: u32 = 0;

        for (group_index, group) in groups.into_iter().enumerate() {
            let tie_group_id = group_index as u32 + 1;
            let group_rank = position + 1;

            for candidate in group {
                position += 1;
                let rank = match self.tie_policy {
                    TiePolicy::Distinct => position,
                    TiePolicy::Shared => group_rank,
                };
                ranked.push(RankedEntry {
                    submission_id: candidate.scores.submission_id,
                    rank,
                    tie_group_id,
                    is_complete: candidate.complete,
                    combined_scores: candidate.scores.scores,
                });
            }
        }
        ranked
    }
}

/// Whether `candidate` belongs to the group anchored at `anchor`
fn within_tolerance(anchor: &Candidate, candidate: &Candidate, epsilon: f64) -> bool {
    if anchor.complete != candidate.complete {
        return false;
    }
    match (anchor.primary.is_nan(), candidate.primary.is_nan()) {
        (true, true) => true,
        (false, false) => {
            // Slack for the rounding of the subtraction itself
            let slack = 4.0 * f64::EPSILON * anchor.primary.abs().max(candidate.primary.abs());
            (candidate.primary - anchor.primary).abs() <= epsilon + slack
        }
        _ => false,
    }
}

/// Order inside a tie group: secondary metric (NaN last), then submission id
fn break_tie(secondary: Option<Direction>, a: &Candidate, b: &Candidate) -> Ordering {
    secondary
        .map(|direction| direction.compare(a.secondary, b.secondary))
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.scores.submission_id.cmp(&b.scores.submission_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramp_leaderboard_domain::{CombinedScore, MetricId};

    fn metric(id: &str) -> MetricId {
        id.parse().unwrap()
    }

    fn metrics() -> MetricSet {
        MetricSet::new(vec![
            MetricDefinition::new(metric("acc"), Direction::HigherIsBetter, 3).with_tolerance(0.001),
            MetricDefinition::new(metric("nll"), Direction::LowerIsBetter, 3),
        ])
        .unwrap()
    }

    fn score(sub: &str, metric_id: &str, value: f64, used: u32) -> CombinedScore {
        CombinedScore {
            submission_id: sub.parse().unwrap(),
            metric_id: metric(metric_id),
            value,
            n_folds_used: used,
            n_folds_expected: 3,
            is_complete: used == 3,
            std_dev: 0.0,
        }
    }

    fn entry(sub: &str, acc: f64, nll: f64) -> SubmissionScores {
        let mut scores = SubmissionScores::new(sub.parse().unwrap());
        scores.insert(score(sub, "acc", acc, 3));
        scores.insert(score(sub, "nll", nll, 3));
        scores
    }

    fn ids(ranked: &[RankedEntry]) -> Vec<&str> {
        ranked.iter().map(|e| e.submission_id.as_str()).collect()
    }

    #[test]
    fn test_orders_by_primary_direction() {
        let metrics = metrics();
        let ranker = Ranker::new(&metrics, &RankingConfig::new(metric("acc"))).unwrap();
        let ranked = ranker
            .rank(vec![entry("b", 0.81, 0.5), entry("a", 0.9, 0.5)])
            .unwrap();

        assert_eq!(ids(&ranked), vec!["a", "b"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert_ne!(ranked[0].tie_group_id, ranked[1].tie_group_id);
    }

    #[test]
    fn test_incomplete_ranks_below_complete() {
        let metrics = metrics();
        let ranker = Ranker::new(&metrics, &RankingConfig::new(metric("acc"))).unwrap();

        let mut incomplete = SubmissionScores::new("c".parse().unwrap());
        incomplete.insert(score("c", "acc", 0.945, 2));
        let ranked = ranker
            .rank(vec![incomplete, entry("b", 0.5, 0.5)])
            .unwrap();

        assert_eq!(ids(&ranked), vec!["b", "c"]);
        assert!(!ranked[1].is_complete);
    }

    #[test]
    fn test_tie_broken_by_secondary_then_id() {
        let metrics = metrics();
        let config = RankingConfig::new(metric("acc")).with_secondary(metric("nll"));
        let ranker = Ranker::new(&metrics, &config).unwrap();

        let ranked = ranker
            .rank(vec![entry("x", 0.8004, 0.30), entry("y", 0.8001, 0.20)])
            .unwrap();
        assert_eq!(ids(&ranked), vec!["y", "x"]);
        assert_eq!(ranked[0].tie_group_id, ranked[1].tie_group_id);

        let no_secondary = Ranker::new(&metrics, &RankingConfig::new(metric("acc"))).unwrap();
        let ranked = no_secondary
            .rank(vec![entry("x", 0.8004, 0.30), entry("w", 0.8001, 0.20)])
            .unwrap();
        assert_eq!(ids(&ranked), vec!["w", "x"]);
    }

    #[test]
    fn test_groups_do_not_chain() {
        let metrics = metrics();
        let config = RankingConfig::new(metric("acc")).with_tie_policy(TiePolicy::Shared);
        let ranker = Ranker::new(&metrics, &config).unwrap();

        // 0.8004 is within tolerance of 0.8012 but not of the anchor 0.8020
        let ranked = ranker
            .rank(vec![
                entry("a", 0.8020, 0.1),
                entry("b", 0.8012, 0.1),
                entry("c", 0.8004, 0.1),
            ])
            .unwrap();

        let ranks: Vec<u32> = ranked.iter().map(|e| e.rank).collect();
        let groups: Vec<u32> = ranked.iter().map(|e| e.tie_group_id).collect();
        assert_eq!(ranks, vec![1, 1, 3]);
        assert_eq!(groups, vec![1, 1, 2]);
    }

    #[test]
    fn test_difference_equal_to_tolerance_ties() {
        let metrics = metrics();
        let config = RankingConfig::new(metric("acc")).with_tie_policy(TiePolicy::Shared);
        let ranker = Ranker::new(&metrics, &config).unwrap();

        // 0.801 - 0.800 is 0.0010000000000000009 in binary floating point
        let ranked = ranker
            .rank(vec![entry("a", 0.801, 0.1), entry("b", 0.800, 0.1), entry("c", 0.7989, 0.1)])
            .unwrap();

        let ranks: Vec<u32> = ranked.iter().map(|e| e.rank).collect();
        let groups: Vec<u32> = ranked.iter().map(|e| e.tie_group_id).collect();
        assert_eq!(ranks, vec![1, 1, 3]);
        assert_eq!(groups, vec![1, 1, 2]);
    }

    #[test]
    fn test_shared_ranks_use_competition_ranking() {
        let metrics = metrics();
        let config = RankingConfig::new(metric("acc")).with_tie_policy(TiePolicy::Shared);
        let ranker = Ranker::new(&metrics, &config).unwrap();

        let ranked = ranker
            .rank(vec![
                entry("a", 0.9, 0.1),
                entry("b", 0.8, 0.1),
                entry("c", 0.8, 0.2),
                entry("d", 0.7, 0.1),
            ])
            .unwrap();
        let ranks: Vec<u32> = ranked.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }

    #[test]
    fn test_nan_primary_sorts_last_in_one_group() {
        let metrics = metrics();
        let ranker = Ranker::new(&metrics, &RankingConfig::new(metric("acc"))).unwrap();

        let empty = |sub: &str| {
            let mut scores = SubmissionScores::new(sub.parse().unwrap());
            scores.insert(CombinedScore::empty(sub.parse().unwrap(), metric("acc"), 3));
            scores
        };
        let mut partial = SubmissionScores::new("p".parse().unwrap());
        partial.insert(score("p", "acc", 0.1, 1));

        let ranked = ranker
            .rank(vec![empty("n2"), partial, empty("n1"), entry("ok", 0.2, 0.1)])
            .unwrap();
        assert_eq!(ids(&ranked), vec!["ok", "p", "n1", "n2"]);
        assert_eq!(ranked[2].tie_group_id, ranked[3].tie_group_id);
        assert_ne!(ranked[1].tie_group_id, ranked[2].tie_group_id);
    }

    #[test]
    fn test_rejects_duplicate_submission() {
        let metrics = metrics();
        let ranker = Ranker::new(&metrics, &RankingConfig::new(metric("acc"))).unwrap();
        let result = ranker.rank(vec![entry("a", 0.9, 0.1), entry("a", 0.8, 0.1)]);
        assert!(matches!(result, Err(RankingError::DuplicateSubmission(_))));
    }

    #[test]
    fn test_rejects_missing_primary_score() {
        let metrics = metrics();
        let ranker = Ranker::new(&metrics, &RankingConfig::new(metric("acc"))).unwrap();
        let result = ranker.rank(vec![SubmissionScores::new("a".parse().unwrap())]);
        assert!(matches!(result, Err(RankingError::MissingScore { .. })));
    }

    #[test]
    fn test_rejects_bad_metric_configuration() {
        let metrics = metrics();
        assert!(matches!(
            Ranker::new(&metrics, &RankingConfig::new(metric("f1"))),
            Err(RankingError::PrimaryMetricNotConfigured(_))
        ));
        assert!(matches!(
            Ranker::new(&metrics, &RankingConfig::new(metric("acc")).with_secondary(metric("f1"))),
            Err(RankingError::SecondaryMetricNotConfigured(_))
        ));
        assert!(matches!(
            Ranker::new(&metrics, &RankingConfig::new(metric("acc")).with_secondary(metric("acc"))),
            Err(RankingError::SecondaryEqualsPrimary(_))
        ));
    }

    #[test]
    fn test_empty_input_ranks_nothing() {
        let metrics = metrics();
        let ranker = Ranker::new(&metrics, &RankingConfig::new(metric("acc"))).unwrap();
        assert!(ranker.rank(Vec::new()).unwrap().is_empty());
    }
}

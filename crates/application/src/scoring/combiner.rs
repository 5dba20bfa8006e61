//! Combiner - folds to one combined score per metric

use crate::scoring::strategies;
use crate::store::ScoreStore;
use ramp_leaderboard_domain::{
    CombinedScore, MetricDefinition, MetricSet, ScoreRecord, SubmissionId, SubmissionScores,
};
use tracing::{debug, instrument};

/// Combine the records of one submission and metric.
///
/// Only valid records with a fold index below `n_folds` count. They are reduced in fold-index order, so the
/// result does not depend on the order the records were supplied in.
pub fn combine_folds<'r, I>(
    definition: &MetricDefinition,
    submission_id: &SubmissionId,
    records: I,
) -> CombinedScore
where
    I: IntoIterator<Item = &'r ScoreRecord>,
{
    let mut folds: Vec<(u32, f64)> = records
        .into_iter()
        .filter(|r| {
            r.is_valid
                && r.value.is_finite()
                && r.metric_id == definition.id
                && r.fold_index < definition.n_folds
        })
        .map(|r| (r.fold_index, r.value))
        .collect();
    folds.sort_by_key(|(i, _)| *i);
    folds.dedup_by_key(|(i, _)| *i);

    let n_folds_used = folds.len() as u32;
    if n_folds_used == 0 {
        return CombinedScore::empty(
            submission_id.clone(),
            definition.id.clone(),
            definition.n_folds,
        );
    }

    CombinedScore {
        submission_id: submission_id.clone(),
        metric_id: definition.id.clone(),
        value: strategies::reduce(&definition.strategy, definition.direction, &folds),
        n_folds_used,
        n_folds_expected: definition.n_folds,
        is_complete: n_folds_used == definition.n_folds,
        std_dev: strategies::sample_std_dev(&folds),
    }
}

/// Combines every submission in a store against its metric set
#[derive(Debug, Clone, Copy)]
pub struct Combiner<'a> {
    metrics: &'a MetricSet,
}

impl<'a> Combiner<'a> {
    pub fn new(metrics: &'a MetricSet) -> Self {
        Self { metrics }
    }

    /// Combined scores of one submission, one per configured metric.
    ///
    /// A metric without any record still gets an (empty, incomplete) score.
    pub fn combine_submission(&self, store: &ScoreStore<'_>, submission_id: &SubmissionId) -> SubmissionScores {
        let mut scores = SubmissionScores::new(submission_id.clone());
        for definition in self.metrics.iter() {
            let records = store.records_for(submission_id, &definition.id);
            scores.insert(combine_folds(definition, submission_id, records));
        }
        scores
    }

    /// Combined scores of every submission in the store, in submission-id order
    #[instrument(skip_all, fields(submissions = store.submission_count()))]
    pub fn combine_all(&self, store: &ScoreStore<'_>) -> Vec<SubmissionScores> {
        let combined: Vec<SubmissionScores> = store
            .submissions()
            .map(|id| self.combine_submission(store, id))
            .collect();

        debug!(
            incomplete = combined
                .iter()
                .flat_map(|s| s.scores.values())
                .filter(|s| !s.is_complete)
                .count(),
            "Combined submission scores"
        );
        combined
    }
}

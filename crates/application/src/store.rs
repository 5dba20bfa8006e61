//! ScoreRecord Store - validated raw fold observations
//!
//! The store accepts records one at a time, rejects anything that cannot be
//! combined, and hands the accepted records back per (submission, metric)
//! pair in fold-index order.

use ramp_leaderboard_domain::{
    Diagnostic, MetricId, MetricSet, RecordError, ScoreRecord, SubmissionId,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Outcome of ingesting a batch of records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestionReport {
    /// Number of records the store accepted
    pub accepted: usize,
    /// Records the store refused, in input order
    pub rejected: Vec<RecordError>,
}

impl IngestionReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn total(&self) -> usize {
        self.accepted + self.rejected.len()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.rejected.iter().map(Diagnostic::from).collect()
    }
}

/// Accepted records of one leaderboard computation
#[derive(Debug, Clone)]
pub struct ScoreStore<'a> {
    metrics: &'a MetricSet,
    records: BTreeMap<(SubmissionId, MetricId), BTreeMap<u32, ScoreRecord>>,
    submissions: BTreeSet<SubmissionId>,
}

impl<'a> ScoreStore<'a> {
    pub fn new(metrics: &'a MetricSet) -> Self {
        Self {
            metrics,
            records: BTreeMap::new(),
            submissions: BTreeSet::new(),
        }
    }

    pub fn metrics(&self) -> &'a MetricSet {
        self.metrics
    }

    /// Validate and store a record.
    ///
    /// The first record of a `(submission, metric, fold)` tuple wins; later
    /// ones are rejected as duplicates.
    pub fn add(&mut self, record: ScoreRecord) -> Result<(), RecordError> {
        let definition = self
            .metrics
            .get(&record.metric_id)
            .ok_or_else(|| RecordError::UnknownMetric {
                submission_id: record.submission_id.clone(),
                metric_id: record.metric_id.clone(),
            })?;

        if record.fold_index >= definition.n_folds {
            return Err(RecordError::FoldOutOfRange {
                submission_id: record.submission_id,
                metric_id: record.metric_id,
                fold_index: record.fold_index,
                n_folds: definition.n_folds,
            });
        }

        if record.is_valid {
            if !record.value.is_finite() {
                return Err(RecordError::NonFiniteValue {
                    submission_id: record.submission_id,
                    metric_id: record.metric_id,
                    fold_index: record.fold_index,
                });
            }

            if let Some(range) = &definition.range {
                if !range.contains(record.value) {
                    return Err(RecordError::ValueOutOfRange {
                        submission_id: record.submission_id,
                        metric_id: record.metric_id,
                        fold_index: record.fold_index,
                        value: record.value,
                        min: range.min,
                        max: range.max,
                    });
                }
            }
        }

        let folds = self
            .records
            .entry((record.submission_id.clone(), record.metric_id.clone()))
            .or_default();
        if folds.contains_key(&record.fold_index) {
            return Err(RecordError::DuplicateRecord {
                submission_id: record.submission_id,
                metric_id: record.metric_id,
                fold_index: record.fold_index,
            });
        }

        self.submissions.insert(record.submission_id.clone());
        folds.insert(record.fold_index, record);
        Ok(())
    }

    /// Add a batch, collecting rejections instead of stopping at the first
    pub fn ingest<I>(&mut self, records: I) -> IngestionReport
    where
        I: IntoIterator<Item = ScoreRecord>,
    {
        let mut report = IngestionReport::default();
        for record in records {
            match self.add(record) {
                Ok(()) => report.accepted += 1,
                Err(error) => {
                    warn!(code = error.kind(), "Rejected score record: {}", error);
                    report.rejected.push(error);
                }
            }
        }

        debug!(
            accepted = report.accepted,
            rejected = report.rejected.len(),
            submissions = self.submissions.len(),
            "Ingested score records"
        );
        report
    }

    /// Records of one submission and metric in fold-index order.
    ///
    /// The iterator is empty when the pair has no records and can be cloned
    /// to walk the records again.
    pub fn records_for<'s>(
        &'s self,
        submission_id: &SubmissionId,
        metric_id: &MetricId,
    ) -> impl Iterator<Item = &'s ScoreRecord> + Clone + 's {
        self.records
            .get(&(submission_id.clone(), metric_id.clone()))
            .into_iter()
            .flat_map(|folds| folds.values())
    }

    /// Every submission with at least one accepted record, sorted by id
    pub fn submissions(&self) -> impl Iterator<Item = &SubmissionId> + '_ {
        self.submissions.iter()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.len()
    }

    /// Total number of accepted records
    pub fn len(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramp_leaderboard_domain::{Direction, MetricDefinition};

    fn metrics() -> MetricSet {
        MetricSet::new(vec![MetricDefinition::new(
            "acc".parse().unwrap(),
            Direction::HigherIsBetter,
            3,
        )
        .with_range(0.0, 1.0)])
        .unwrap()
    }

    fn record(fold: u32, value: f64) -> ScoreRecord {
        ScoreRecord::valid("a".parse().unwrap(), "acc".parse().unwrap(), fold, value)
    }

    #[test]
    fn test_add_accepts_valid_record() {
        let metrics = metrics();
        let mut store = ScoreStore::new(&metrics);
        store.add(record(0, 0.5)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.submission_count(), 1);
    }

    #[test]
    fn test_add_rejects_unknown_metric() {
        let metrics = metrics();
        let mut store = ScoreStore::new(&metrics);
        let unknown = ScoreRecord::valid("a".parse().unwrap(), "f1".parse().unwrap(), 0, 0.5);
        assert!(matches!(
            store.add(unknown),
            Err(RecordError::UnknownMetric { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_rejects_fold_out_of_range() {
        let metrics = metrics();
        let mut store = ScoreStore::new(&metrics);
        assert!(matches!(
            store.add(record(3, 0.5)),
            Err(RecordError::FoldOutOfRange { n_folds: 3, .. })
        ));
    }

    #[test]
    fn test_add_rejects_non_finite_valid_value() {
        let metrics = metrics();
        let mut store = ScoreStore::new(&metrics);
        assert!(matches!(
            store.add(record(0, f64::INFINITY)),
            Err(RecordError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_add_rejects_value_outside_range() {
        let metrics = metrics();
        let mut store = ScoreStore::new(&metrics);
        assert!(matches!(
            store.add(record(0, 1.5)),
            Err(RecordError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_invalid_record_skips_value_checks() {
        let metrics = metrics();
        let mut store = ScoreStore::new(&metrics);
        store
            .add(ScoreRecord::invalid("a".parse().unwrap(), "acc".parse().unwrap(), 1))
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_first_record_wins_on_duplicate() {
        let metrics = metrics();
        let mut store = ScoreStore::new(&metrics);
        store.add(record(0, 0.5)).unwrap();
        assert!(matches!(
            store.add(record(0, 0.7)),
            Err(RecordError::DuplicateRecord { .. })
        ));

        let kept: Vec<f64> = store
            .records_for(&"a".parse().unwrap(), &"acc".parse().unwrap())
            .map(|r| r.value)
            .collect();
        assert_eq!(kept, vec![0.5]);
    }

    #[test]
    fn test_records_for_yields_fold_order_and_restarts() {
        let metrics = metrics();
        let mut store = ScoreStore::new(&metrics);
        let report = store.ingest(vec![record(2, 0.3), record(0, 0.1), record(1, 0.2)]);
        assert_eq!(report.accepted, 3);
        assert!(report.is_clean());

        let iter = store.records_for(&"a".parse().unwrap(), &"acc".parse().unwrap());
        let folds: Vec<u32> = iter.clone().map(|r| r.fold_index).collect();
        assert_eq!(folds, vec![0, 1, 2]);
        assert_eq!(iter.count(), 3);
    }

    #[test]
    fn test_records_for_unknown_pair_is_empty() {
        let metrics = metrics();
        let store = ScoreStore::new(&metrics);
        assert_eq!(
            store
                .records_for(&"nobody".parse().unwrap(), &"acc".parse().unwrap())
                .count(),
            0
        );
    }

    #[test]
    fn test_ingest_collects_rejections_in_order() {
        let metrics = metrics();
        let mut store = ScoreStore::new(&metrics);
        let report = store.ingest(vec![record(0, 0.5), record(0, 0.6), record(9, 0.1)]);

        assert_eq!(report.accepted, 1);
        assert_eq!(report.total(), 3);
        let kinds: Vec<&str> = report.rejected.iter().map(RecordError::kind).collect();
        assert_eq!(kinds, vec!["duplicate_record", "fold_out_of_range"]);
        assert_eq!(report.diagnostics().len(), 2);
    }

    #[test]
    fn test_submissions_sorted() {
        let metrics = metrics();
        let mut store = ScoreStore::new(&metrics);
        for id in ["zeta", "alpha", "mid"] {
            store
                .add(ScoreRecord::valid(id.parse().unwrap(), "acc".parse().unwrap(), 0, 0.5))
                .unwrap();
        }
        let ids: Vec<&str> = store.submissions().map(|s| s.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }
}

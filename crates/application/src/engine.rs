//! Leaderboard engine - records in, leaderboard out
//!
//! `compute_leaderboard` runs the whole pipeline: store, combiner, ranker and
//! assembler. It holds no state between calls and produces the same
//! leaderboard for the same input sequence.

use crate::assembler;
use crate::ranking::Ranker;
use crate::scoring::Combiner;
use crate::store::{IngestionReport, ScoreStore};
use ramp_leaderboard_domain::{
    Leaderboard, LeaderboardConfig, LeaderboardError, MetadataLookup, MetricSet, ScoreRecord,
};
use tracing::{debug, info, instrument};

/// Compute a leaderboard from raw score records.
///
/// Rejected records are reported as diagnostics on the leaderboard. Ranking
/// errors and missing metadata under the `fail` policy abort the computation.
#[instrument(
    skip_all,
    fields(
        primary = %config.ranking.primary_metric,
        metrics = config.metrics.len(),
        tie_policy = ?config.ranking.tie_policy
    )
)]
pub fn compute_leaderboard<I, M>(
    records: I,
    config: &LeaderboardConfig,
    metadata: &M,
) -> Result<Leaderboard, LeaderboardError>
where
    I: IntoIterator<Item = ScoreRecord>,
    M: MetadataLookup + ?Sized,
{
    let ranker = Ranker::new(&config.metrics, &config.ranking)?;

    let mut store = ScoreStore::new(&config.metrics);
    let report = store.ingest(records);

    let combined = Combiner::new(&config.metrics).combine_all(&store);
    debug!(submissions = combined.len(), "Combined scores");

    let ranked = ranker.rank(combined)?;
    let leaderboard = assembler::assemble(ranked, config, metadata, report.diagnostics())?;

    info!(
        rows = leaderboard.len(),
        rejected = report.rejected.len(),
        diagnostics = leaderboard.diagnostics.len(),
        "Computed leaderboard"
    );
    Ok(leaderboard)
}

/// Ingest records without ranking them, reporting what would be rejected
#[instrument(skip_all, fields(metrics = metrics.len()))]
pub fn validate_records<I>(records: I, metrics: &MetricSet) -> IngestionReport
where
    I: IntoIterator<Item = ScoreRecord>,
{
    ScoreStore::new(metrics).ingest(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ramp_leaderboard_domain::{
        Direction, MetricDefinition, RankingConfig, SubmissionId, SubmissionMetadata,
    };
    use std::collections::HashMap;

    fn config() -> LeaderboardConfig {
        let metrics = MetricSet::new(vec![MetricDefinition::new(
            "accuracy".parse().unwrap(),
            Direction::HigherIsBetter,
            2,
        )])
        .unwrap();
        LeaderboardConfig::new(metrics, RankingConfig::new("accuracy".parse().unwrap()))
    }

    fn record(sub: &str, fold: u32, value: f64) -> ScoreRecord {
        ScoreRecord::valid(sub.parse().unwrap(), "accuracy".parse().unwrap(), fold, value)
    }

    fn metadata(ids: &[&str]) -> HashMap<SubmissionId, SubmissionMetadata> {
        ids.iter()
            .map(|id| (id.parse().unwrap(), SubmissionMetadata::new("author", None, *id)))
            .collect()
    }

    #[test]
    fn test_rejected_records_become_diagnostics() {
        let board = compute_leaderboard(
            vec![record("a", 0, 0.5), record("a", 1, 0.6), record("a", 5, 0.9)],
            &config(),
            &metadata(&["a"]),
        )
        .unwrap();

        assert_eq!(board.len(), 1);
        assert_eq!(board.diagnostics.len(), 1);
        assert_eq!(board.diagnostics[0].kind, "fold_out_of_range");
    }

    #[test]
    fn test_unknown_primary_metric_is_fatal() {
        let mut config = config();
        config.ranking.primary_metric = "f1".parse().unwrap();

        let error = compute_leaderboard(Vec::new(), &config, &metadata(&[])).unwrap_err();
        assert_eq!(error.error_code(), "RANKING_ERROR");
    }

    #[test]
    fn test_empty_input_gives_empty_leaderboard() {
        let board = compute_leaderboard(Vec::new(), &config(), &metadata(&[])).unwrap();
        assert!(board.is_empty());
        assert_eq!(board.metrics.len(), 1);
    }

    #[test]
    fn test_validate_records_reports_rejections() {
        let report = validate_records(
            vec![record("a", 0, 0.5), record("a", 0, 0.5)],
            &config().metrics,
        );
        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected.len(), 1);
    }
}

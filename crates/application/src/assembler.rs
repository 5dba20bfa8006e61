//! Leaderboard Assembler - joins ranked entries with submission metadata
//!
//! The assembler neither reorders nor filters; row `i` of the leaderboard is
//! ranked entry `i`.

use ramp_leaderboard_domain::{
    Diagnostic, Leaderboard, LeaderboardConfig, LeaderboardError, LeaderboardRow, MetadataLookup,
    MetricId, MissingMetadataPolicy, RankedEntry, SubmissionMetadata,
};
use tracing::warn;

/// Metric ids in display order: the primary metric first, then the rest by id
pub fn display_metrics(config: &LeaderboardConfig) -> Vec<MetricId> {
    let primary = &config.ranking.primary_metric;
    std::iter::once(primary.clone())
        .chain(config.metrics.ids().filter(|id| *id != primary).cloned())
        .collect()
}

/// Build the final leaderboard.
///
/// `diagnostics` are the ingestion diagnostics gathered so far; placeholder
/// metadata diagnostics are appended after them.
pub fn assemble<M>(
    entries: Vec<RankedEntry>,
    config: &LeaderboardConfig,
    metadata: &M,
    mut diagnostics: Vec<Diagnostic>,
) -> Result<Leaderboard, LeaderboardError>
where
    M: MetadataLookup + ?Sized,
{
    let mut rows = Vec::with_capacity(entries.len());

    for entry in entries {
        let row = match metadata.lookup(&entry.submission_id) {
            Some(found) => LeaderboardRow::from_entry(entry, found, false),
            None => match config.missing_metadata {
                MissingMetadataPolicy::Fail => {
                    return Err(LeaderboardError::MissingMetadata {
                        submission_id: entry.submission_id,
                    });
                }
                MissingMetadataPolicy::Placeholder => {
                    warn!(
                        submission_id = %entry.submission_id,
                        "No metadata for submission, using placeholder"
                    );
                    diagnostics.push(Diagnostic::missing_metadata(&entry.submission_id));
                    let placeholder = SubmissionMetadata::placeholder(&entry.submission_id);
                    LeaderboardRow::from_entry(entry, placeholder, true)
                }
            },
        };
        rows.push(row);
    }

    Ok(Leaderboard {
        primary_metric: config.ranking.primary_metric.clone(),
        secondary_metric: config.ranking.secondary_metric.clone(),
        tie_policy: config.ranking.tie_policy,
        metrics: display_metrics(config),
        rows,
        diagnostics,
    })
}

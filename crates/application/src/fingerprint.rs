//! Input fingerprints used as leaderboard cache keys

use ramp_leaderboard_common::crypto;
use ramp_leaderboard_domain::{LeaderboardConfig, ScoreRecord, SubmissionId, SubmissionMetadata};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bumped whenever the leaderboard layout changes, invalidating old keys
const FINGERPRINT_VERSION: u32 = 1;

#[derive(Serialize)]
struct FingerprintInput<'a> {
    version: u32,
    config: &'a LeaderboardConfig,
    records: &'a [ScoreRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a BTreeMap<SubmissionId, SubmissionMetadata>>,
}

/// BLAKE3 fingerprint of everything a leaderboard is computed from.
///
/// Records are hashed in input order; metadata, when given, is hashed in
/// submission-id order.
pub fn leaderboard_fingerprint(
    config: &LeaderboardConfig,
    records: &[ScoreRecord],
    metadata: Option<&BTreeMap<SubmissionId, SubmissionMetadata>>,
) -> anyhow::Result<String> {
    crypto::fingerprint_json(&FingerprintInput {
        version: FINGERPRINT_VERSION,
        config,
        records,
        metadata,
    })
}

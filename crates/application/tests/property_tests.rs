//! Property tests for combination and ranking
//!
//! Tests order invariance of every strategy and the shape of rank sequences
//! under both tie policies.

use proptest::prelude::*;
use ramp_leaderboard_application::{combine_folds, compute_leaderboard};
use ramp_leaderboard_domain::{
    BagWeighting, CombinationStrategy, Direction, LeaderboardConfig, MetricDefinition, ScoreRecord,
    TiePolicy,
};
use ramp_leaderboard_testing::{builders::*, strategies};

fn strategy_by_index(index: usize) -> CombinationStrategy {
    match index % 5 {
        0 => CombinationStrategy::Mean,
        1 => CombinationStrategy::BestOfK,
        2 => CombinationStrategy::Median,
        3 => CombinationStrategy::Bagged {
            weighting: BagWeighting::Cumulative,
        },
        _ => CombinationStrategy::Bagged {
            weighting: BagWeighting::Explicit {
                weights: vec![0.5, 2.0, 1.0, 3.0],
            },
        },
    }
}

fn config(tie_policy: TiePolicy) -> LeaderboardConfig {
    let builder = LeaderboardConfigBuilder::new().with_metric(
        MetricDefinition::new(id("score"), Direction::HigherIsBetter, 4).with_tolerance(0.05),
    );
    match tie_policy {
        TiePolicy::Distinct => builder.build(),
        TiePolicy::Shared => builder.shared_ranks().build(),
    }
}

fn records(submissions: &[(String, Vec<Option<f64>>)]) -> Vec<ScoreRecord> {
    submissions
        .iter()
        .fold(RecordsBuilder::new(), |builder, (name, values)| {
            builder.folds(name, "score", values)
        })
        .build()
}

proptest! {
    #[test]
    fn prop_combination_is_order_invariant(
        values in strategies::fold_values(4),
        strategy in 0usize..5,
        seed in any::<u64>(),
    ) {
        let definition = MetricDefinition::new(id("score"), Direction::HigherIsBetter, 4)
            .with_strategy(strategy_by_index(strategy));
        let forward = RecordsBuilder::new().folds("s", "score", &values).build();

        // Deterministic permutation derived from the seed
        let mut shuffled = forward.clone();
        let len = shuffled.len();
        if len > 1 {
            shuffled.rotate_left((seed % len as u64) as usize);
            if seed % 2 == 0 {
                shuffled.reverse();
            }
        }

        let a = combine_folds(&definition, &id("s"), &forward);
        let b = combine_folds(&definition, &id("s"), &shuffled);
        prop_assert_eq!(a.value.to_bits(), b.value.to_bits());
        prop_assert_eq!(a.n_folds_used, b.n_folds_used);
        prop_assert_eq!(a.is_complete, b.is_complete);
    }

    #[test]
    fn prop_completeness_matches_fold_count(values in strategies::fold_values(4)) {
        let definition = MetricDefinition::new(id("score"), Direction::HigherIsBetter, 4);
        let recs = RecordsBuilder::new().folds("s", "score", &values).build();
        let combined = combine_folds(&definition, &id("s"), &recs);

        let valid = values.iter().filter(|v| v.is_some()).count() as u32;
        prop_assert_eq!(combined.n_folds_used, valid);
        prop_assert!(combined.n_folds_used <= combined.n_folds_expected);
        prop_assert_eq!(combined.is_complete, valid == 4);
        prop_assert_eq!(combined.value.is_nan(), valid == 0);
    }

    #[test]
    fn prop_distinct_ranks_are_one_to_k(subs in strategies::submissions(12, 4)) {
        let config = config(TiePolicy::Distinct);
        let metadata = MetadataBuilder::new()
            .for_submissions(&subs.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>())
            .build();
        let board = compute_leaderboard(records(&subs), &config, &metadata).unwrap();

        let ranks: Vec<u32> = board.rows.iter().map(|r| r.rank).collect();
        let expected: Vec<u32> = (1..=board.len() as u32).collect();
        prop_assert_eq!(ranks, expected);
    }

    #[test]
    fn prop_shared_ranks_are_competition_ranks(
        subs in prop::collection::vec(strategies::coarse_fold_values(4), 1..12)
    ) {
        let subs: Vec<(String, Vec<Option<f64>>)> = subs
            .into_iter()
            .enumerate()
            .map(|(i, v)| (format!("s{}", i), v))
            .collect();
        let config = config(TiePolicy::Shared);
        let metadata = MetadataBuilder::new()
            .for_submissions(&subs.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>())
            .build();
        let board = compute_leaderboard(records(&subs), &config, &metadata).unwrap();

        let mut previous_group = 0;
        for (position, row) in board.rows.iter().enumerate() {
            let position = position as u32 + 1;
            prop_assert!(row.rank <= position);
            if row.tie_group_id != previous_group {
                // A new group starts at its own position
                prop_assert_eq!(row.tie_group_id, previous_group + 1);
                prop_assert_eq!(row.rank, position);
                previous_group = row.tie_group_id;
            } else {
                prop_assert_eq!(row.rank, board.rows[position as usize - 2].rank);
            }
        }
    }

    #[test]
    fn prop_complete_rows_precede_incomplete(subs in strategies::submissions(12, 4)) {
        let config = config(TiePolicy::Distinct);
        let metadata = MetadataBuilder::new()
            .for_submissions(&subs.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>())
            .build();
        let board = compute_leaderboard(records(&subs), &config, &metadata).unwrap();

        let first_incomplete = board.rows.iter().position(|r| !r.is_complete);
        if let Some(index) = first_incomplete {
            prop_assert!(board.rows[index..].iter().all(|r| !r.is_complete));
        }
    }
}

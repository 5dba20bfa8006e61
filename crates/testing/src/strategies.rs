//! Proptest strategies for leaderboard inputs

use proptest::prelude::*;

/// Per-fold values of one submission: `None` marks an invalid fold
pub fn fold_values(n_folds: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.85, 0.0f64..1.0), n_folds)
}

/// Fold values of `1..=max_submissions` submissions named `s0`, `s1`, ...
pub fn submissions(
    max_submissions: usize,
    n_folds: usize,
) -> impl Strategy<Value = Vec<(String, Vec<Option<f64>>)>> {
    prop::collection::vec(fold_values(n_folds), 1..=max_submissions).prop_map(|all| {
        all.into_iter()
            .enumerate()
            .map(|(i, values)| (format!("s{}", i), values))
            .collect()
    })
}

/// Values rounded to a coarse grid so that ties actually occur
pub fn coarse_fold_values(n_folds: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(
        prop::option::weighted(0.85, (0u32..20).prop_map(|v| f64::from(v) / 20.0)),
        n_folds,
    )
}

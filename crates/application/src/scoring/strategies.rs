//! Combination strategies - pure reductions over valid fold values
//!
//! Every function here takes the valid folds of one submission and metric as
//! `(fold_index, value)` pairs sorted by fold index. Callers guarantee that
//! the values are finite.

use ramp_leaderboard_domain::{BagWeighting, CombinationStrategy, Direction};

/// Reduce valid folds with the given strategy.
///
/// Returns NaN when there is nothing to reduce.
pub fn reduce(strategy: &CombinationStrategy, direction: Direction, folds: &[(u32, f64)]) -> f64 {
    if folds.is_empty() {
        return f64::NAN;
    }

    match strategy {
        CombinationStrategy::Mean => mean(folds),
        CombinationStrategy::BestOfK => best_of_k(direction, folds),
        CombinationStrategy::Median => median(folds),
        CombinationStrategy::Bagged { weighting } => bagged(weighting, folds),
    }
}

/// Arithmetic mean
pub fn mean(folds: &[(u32, f64)]) -> f64 {
    if folds.is_empty() {
        return f64::NAN;
    }
    folds.iter().map(|(_, v)| v).sum::<f64>() / folds.len() as f64
}

/// Best value in the metric's direction
pub fn best_of_k(direction: Direction, folds: &[(u32, f64)]) -> f64 {
    folds
        .iter()
        .map(|(_, v)| *v)
        .reduce(|best, v| direction.best(best, v))
        .unwrap_or(f64::NAN)
}

/// Median; the average of the two middle values for an even count
pub fn median(folds: &[(u32, f64)]) -> f64 {
    if folds.is_empty() {
        return f64::NAN;
    }

    let mut sorted: Vec<f64> = folds.iter().map(|(_, v)| *v).collect();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Weighted mean with weights taken from the fold index.
///
/// Falls back to the plain mean when the weights sum to zero.
pub fn bagged(weighting: &BagWeighting, folds: &[(u32, f64)]) -> f64 {
    if folds.is_empty() {
        return f64::NAN;
    }

    let weight_sum: f64 = folds.iter().map(|(i, _)| weighting.weight(*i)).sum();
    if weight_sum == 0.0 {
        return mean(folds);
    }

    folds
        .iter()
        .map(|(i, v)| weighting.weight(*i) * v)
        .sum::<f64>()
        / weight_sum
}

/// Sample standard deviation: 0 for a single value, NaN for none
pub fn sample_std_dev(folds: &[(u32, f64)]) -> f64 {
    match folds.len() {
        0 => f64::NAN,
        1 => 0.0,
        n => {
            let mean = mean(folds);
            let variance = folds
                .iter()
                .map(|(_, v)| (v - mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64;
            variance.sqrt()
        }
    }
}

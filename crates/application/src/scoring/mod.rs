//! Scoring module - fold combination
//!
//! This module reduces the per-fold observations of each submission into one
//! combined score per metric, using the strategy configured on the metric.

mod combiner;
pub mod strategies;

pub use combiner::*;

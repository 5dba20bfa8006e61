//! RAMP submission directories
//!
//! A RAMP kit keeps one directory per submission:
//!
//! ```text
//! <root>/submissions/<submission>/training_output/fold_<i>/scores.csv
//! ```
//!
//! Each `scores.csv` has a `step` column (`train`, `valid`, `test`) and one
//! column per score. Every configured metric and fold yields exactly one
//! record; a missing fold, row or cell is recorded as an invalid fold.

use super::records::ParsedRecords;
use crate::{Error, Result};
use ramp_leaderboard_domain::{MetricSet, RecordError, ScoreRecord, SubmissionId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Directory holding one subdirectory per submission
pub const SUBMISSIONS_DIR: &str = "submissions";

/// Per-submission directory with the fold outputs
pub const TRAINING_OUTPUT_DIR: &str = "training_output";

/// Score file name inside each fold directory
pub const SCORES_FILE: &str = "scores.csv";

/// Whether `root` looks like a RAMP kit
pub fn is_ramp_kit(root: &Path) -> bool {
    root.join(SUBMISSIONS_DIR).is_dir()
}

fn fold_scores_path(submission_dir: &Path, fold: u32) -> PathBuf {
    submission_dir
        .join(TRAINING_OUTPUT_DIR)
        .join(format!("fold_{}", fold))
        .join(SCORES_FILE)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Submission directories under `<root>/submissions`, sorted by name
fn submission_dirs(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let dir = root.join(SUBMISSIONS_DIR);
    let mut dirs = Vec::new();

    for entry in std::fs::read_dir(&dir).map_err(io_error(&dir))? {
        let entry = entry.map_err(io_error(&dir))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => dirs.push((name, path)),
            Err(name) => warn!(?name, "Skipping submission directory with non UTF-8 name"),
        }
    }

    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

/// The `step` row of one `scores.csv`, keyed by column name.
///
/// Returns `None` when the file does not exist.
fn read_step_row(path: &Path, step: &str) -> Result<Option<HashMap<String, String>>> {
    if !path.is_file() {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let step_column = headers
        .iter()
        .position(|h| h == "step")
        .ok_or_else(|| Error::Parse(format!("{}: no 'step' column", path.display())))?;

    for row in reader.records() {
        let row = row?;
        if row.get(step_column) == Some(step) {
            let cells = headers
                .iter()
                .zip(row.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect();
            return Ok(Some(cells));
        }
    }

    Ok(Some(HashMap::new()))
}

fn cell_value(cells: &HashMap<String, String>, metric: &str) -> Option<f64> {
    let raw = cells.get(metric)?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Load every submission of a RAMP kit for the configured metrics
#[instrument(skip(metrics), fields(root = %root.display(), metrics = metrics.len()))]
pub fn load_ramp_kit(root: &Path, metrics: &MetricSet, step: &str) -> Result<ParsedRecords> {
    if !is_ramp_kit(root) {
        return Err(Error::NotFound(format!(
            "{} has no '{}' directory",
            root.display(),
            SUBMISSIONS_DIR
        )));
    }

    let mut parsed = ParsedRecords::default();
    let max_folds = metrics.iter().map(|m| m.n_folds).max().unwrap_or(0);

    for (name, dir) in submission_dirs(root)? {
        let submission_id = match SubmissionId::new(name.as_str()) {
            Ok(id) => id,
            Err(e) => {
                parsed.malformed.push(RecordError::Malformed {
                    location: dir.display().to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        if !dir.join(TRAINING_OUTPUT_DIR).is_dir() {
            debug!(submission = %submission_id, "Submission has no training output");
        }

        for fold in 0..max_folds {
            let path = fold_scores_path(&dir, fold);
            let cells = match read_step_row(&path, step) {
                Ok(cells) => cells,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Unreadable fold scores");
                    parsed.malformed.push(RecordError::Malformed {
                        location: path.display().to_string(),
                        message: e.to_string(),
                    });
                    None
                }
            };

            for definition in metrics.iter().filter(|m| fold < m.n_folds) {
                let value = cells
                    .as_ref()
                    .and_then(|cells| cell_value(cells, definition.id.as_str()));
                let record = match value {
                    Some(value) => ScoreRecord::valid(
                        submission_id.clone(),
                        definition.id.clone(),
                        fold,
                        value,
                    ),
                    None => ScoreRecord::invalid(submission_id.clone(), definition.id.clone(), fold),
                };
                parsed.records.push(record);
            }
        }
    }

    debug!(
        records = parsed.records.len(),
        malformed = parsed.malformed.len(),
        "Loaded RAMP kit"
    );
    Ok(parsed)
}

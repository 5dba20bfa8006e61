//! Input loaders
//!
//! An input is either a record file (`.csv`, `.json`, `.jsonl`) or a RAMP
//! kit directory. Kits may carry their own `submissions/metadata.csv`.

mod ramp;
mod records;

pub use ramp::{is_ramp_kit, load_ramp_kit, SCORES_FILE, SUBMISSIONS_DIR, TRAINING_OUTPUT_DIR};
pub use records::{
    load_records, parse_csv, parse_json, parse_jsonl, parse_records, ParsedRecords, RecordFormat,
};

use crate::registry::MetadataRegistry;
use crate::{Error, Result};
use ramp_leaderboard_domain::{MetricSet, RecordError, ScoreRecord};
use std::path::Path;
use tracing::{debug, instrument};

/// Metadata file picked up from a kit's submissions directory
pub const KIT_METADATA_FILE: &str = "metadata.csv";

/// Everything read from one input path
#[derive(Debug, Clone)]
pub struct LoadedInput {
    /// Display name of the input, the path as given
    pub name: String,
    pub records: Vec<ScoreRecord>,
    /// Rows or files that could not be read as records
    pub malformed: Vec<RecordError>,
    /// Metadata shipped with the input, if any
    pub metadata: Option<MetadataRegistry>,
}

/// Load a record file or a RAMP kit directory.
///
/// `metrics` and `step` only matter for kits, whose score files hold every
/// metric as a column.
#[instrument(skip(metrics), fields(path = %path.display()))]
pub fn load_input(path: &Path, metrics: &MetricSet, step: &str) -> Result<LoadedInput> {
    let name = path.display().to_string();

    if path.is_dir() {
        let parsed = load_ramp_kit(path, metrics, step)?;
        let metadata_path = path.join(SUBMISSIONS_DIR).join(KIT_METADATA_FILE);
        let metadata = if metadata_path.is_file() {
            Some(MetadataRegistry::load(&metadata_path)?)
        } else {
            None
        };
        debug!(has_metadata = metadata.is_some(), "Loaded kit directory");

        return Ok(LoadedInput {
            name,
            records: parsed.records,
            malformed: parsed.malformed,
            metadata,
        });
    }

    if !path.exists() {
        return Err(Error::NotFound(name));
    }

    let parsed = load_records(path)?;
    Ok(LoadedInput {
        name,
        records: parsed.records,
        malformed: parsed.malformed,
        metadata: None,
    })
}

//! Submission metadata registry
//!
//! Metadata files list one submission per row or object with the fields
//! `submission_id`, `author`, `timestamp` and `display_name`. Only
//! `submission_id` is required.

use crate::{Error, Result};
use ramp_leaderboard_common::datetime::parse_datetime;
use ramp_leaderboard_domain::{MetadataLookup, SubmissionId, SubmissionMetadata};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct MetadataRow {
    submission_id: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default, alias = "submitted_at")]
    timestamp: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl MetadataRow {
    fn into_entry(self) -> std::result::Result<(SubmissionId, SubmissionMetadata), String> {
        let id = SubmissionId::new(self.submission_id).map_err(|e| e.to_string())?;
        let timestamp = match self.timestamp.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_datetime(raw)?),
        };
        let author = self
            .author
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let display_name = self
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.to_string());

        Ok((id, SubmissionMetadata::new(author, timestamp, display_name)))
    }
}

/// In-memory metadata keyed by submission id
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    entries: BTreeMap<SubmissionId, SubmissionMetadata>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the metadata of a submission
    pub fn insert(&mut self, submission_id: SubmissionId, metadata: SubmissionMetadata) {
        self.entries.insert(submission_id, metadata);
    }

    pub fn get(&self, submission_id: &SubmissionId) -> Option<&SubmissionMetadata> {
        self.entries.get(submission_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in submission-id order
    pub fn entries(&self) -> &BTreeMap<SubmissionId, SubmissionMetadata> {
        &self.entries
    }

    /// Add every entry of `other`, replacing existing ones
    pub fn merge(&mut self, other: MetadataRegistry) {
        self.entries.extend(other.entries);
    }

    /// Parse CSV metadata with a header row.
    ///
    /// Metadata is all-or-nothing: the first bad row fails the whole file.
    pub fn from_csv(data: &[u8], source: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data);
        let mut registry = Self::new();

        for (row_num, row) in reader.deserialize::<MetadataRow>().enumerate() {
            let (id, metadata) = row
                .map_err(|e| e.to_string())
                .and_then(MetadataRow::into_entry)
                .map_err(|e| Error::Parse(format!("{}:{}: {}", source, row_num + 2, e)))?;
            registry.insert(id, metadata);
        }

        Ok(registry)
    }

    /// Parse a JSON array of metadata objects
    pub fn from_json(data: &[u8], source: &str) -> Result<Self> {
        let rows: Vec<MetadataRow> = serde_json::from_slice(data)
            .map_err(|e| Error::Parse(format!("{}: {}", source, e)))?;
        let mut registry = Self::new();

        for (i, row) in rows.into_iter().enumerate() {
            let (id, metadata) = row
                .into_entry()
                .map_err(|e| Error::Parse(format!("{}[{}]: {}", source, i, e)))?;
            registry.insert(id, metadata);
        }

        Ok(registry)
    }

    /// Load a `.csv` or `.json` metadata file
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = path.display().to_string();

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        let registry = match extension.as_deref() {
            Some("csv") => Self::from_csv(&data, &source)?,
            Some("json") => Self::from_json(&data, &source)?,
            _ => {
                return Err(Error::UnsupportedFormat(format!(
                    "Metadata must be .csv or .json: {}",
                    path.display()
                )))
            }
        };

        debug!(entries = registry.len(), "Loaded submission metadata");
        Ok(registry)
    }
}

impl MetadataLookup for MetadataRegistry {
    fn lookup(&self, submission_id: &SubmissionId) -> Option<SubmissionMetadata> {
        self.entries.get(submission_id).cloned()
    }
}

impl FromIterator<(SubmissionId, SubmissionMetadata)> for MetadataRegistry {
    fn from_iter<I: IntoIterator<Item = (SubmissionId, SubmissionMetadata)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_from_csv() {
        let data = b"submission_id,author,timestamp,display_name\n\
            starting_kit,alice,2024-03-01T12:30:00Z,Starting kit\n\
            rf,bob,,\n";
        let registry = MetadataRegistry::from_csv(data, "metadata.csv").unwrap();

        assert_eq!(registry.len(), 2);
        let kit = registry.lookup(&"starting_kit".parse().unwrap()).unwrap();
        assert_eq!(kit.author, "alice");
        assert_eq!(kit.display_name, "Starting kit");
        let ts = kit.timestamp.unwrap();
        assert_eq!((ts.year(), ts.month(), ts.hour(), ts.minute()), (2024, 3, 12, 30));

        let rf = registry.lookup(&"rf".parse().unwrap()).unwrap();
        assert_eq!(rf.display_name, "rf");
        assert!(rf.timestamp.is_none());
    }

    #[test]
    fn test_csv_with_only_ids() {
        let data = b"submission_id\nkit\n";
        let registry = MetadataRegistry::from_csv(data, "metadata.csv").unwrap();
        let kit = registry.get(&"kit".parse().unwrap()).unwrap();
        assert_eq!(kit.author, "unknown");
    }

    #[test]
    fn test_bad_timestamp_names_the_row() {
        let data = b"submission_id,author,timestamp\nkit,alice,yesterday\n";
        let error = MetadataRegistry::from_csv(data, "metadata.csv").unwrap_err();
        assert!(error.to_string().contains("metadata.csv:2"));
    }

    #[test]
    fn test_from_json() {
        let data = br#"[
            {"submission_id": "kit", "author": "alice", "submitted_at": "2024-03-01"},
            {"submission_id": "rf", "display_name": "Random forest"}
        ]"#;
        let registry = MetadataRegistry::from_json(data, "metadata.json").unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get(&"kit".parse().unwrap()).unwrap().timestamp.is_some());
        assert_eq!(
            registry.get(&"rf".parse().unwrap()).unwrap().display_name,
            "Random forest"
        );
    }

    #[test]
    fn test_merge_replaces_existing() {
        let mut base: MetadataRegistry = vec![(
            "kit".parse().unwrap(),
            SubmissionMetadata::new("alice", None, "old"),
        )]
        .into_iter()
        .collect();
        let update: MetadataRegistry = vec![(
            "kit".parse().unwrap(),
            SubmissionMetadata::new("alice", None, "new"),
        )]
        .into_iter()
        .collect();

        base.merge(update);
        assert_eq!(base.get(&"kit".parse().unwrap()).unwrap().display_name, "new");
    }
}

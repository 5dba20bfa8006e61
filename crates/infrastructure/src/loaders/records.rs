//! Score record files - CSV, JSON and JSON Lines
//!
//! Every format yields the same `ScoreRecord`s. Rows that cannot be turned
//! into a record are skipped and reported with their position instead of
//! failing the whole file.

use crate::{Error, Result};
use ramp_leaderboard_domain::{MetricId, RecordError, ScoreRecord, SubmissionId};
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Supported record file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// `submission_id,metric_id,fold_index,value[,is_valid]` with a header row
    Csv,
    /// A JSON array of records
    Json,
    /// One JSON record per line
    Jsonl,
}

impl RecordFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(RecordFormat::Json),
                "jsonl" | "ndjson" => Some(RecordFormat::Jsonl),
                "csv" => Some(RecordFormat::Csv),
                _ => None,
            })
    }
}

/// Records parsed from one source plus the rows that could not be parsed
#[derive(Debug, Clone, Default)]
pub struct ParsedRecords {
    pub records: Vec<ScoreRecord>,
    pub malformed: Vec<RecordError>,
}

impl ParsedRecords {
    fn reject(&mut self, location: String, message: impl Into<String>) {
        let error = RecordError::Malformed {
            location,
            message: message.into(),
        };
        warn!("Skipping malformed record: {}", error);
        self.malformed.push(error);
    }
}

/// A CSV row before validation
#[derive(Debug, Deserialize)]
struct CsvRow {
    submission_id: String,
    metric_id: String,
    fold_index: u32,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    is_valid: Option<bool>,
}

/// Mark valid records without a usable value as invalid folds.
///
/// Infinite values stay valid so that the store reports them.
fn normalize(mut record: ScoreRecord) -> ScoreRecord {
    if record.is_valid && record.value.is_nan() {
        record.is_valid = false;
    }
    record
}

fn parse_value(raw: Option<&str>) -> std::result::Result<f64, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(f64::NAN),
        Some(text) if text.eq_ignore_ascii_case("nan") => Ok(f64::NAN),
        Some(text) => text
            .parse::<f64>()
            .map_err(|e| format!("invalid value '{}': {}", text, e)),
    }
}

fn csv_row_to_record(row: CsvRow) -> std::result::Result<ScoreRecord, String> {
    let submission_id = SubmissionId::new(row.submission_id).map_err(|e| e.to_string())?;
    let metric_id = MetricId::new(row.metric_id).map_err(|e| e.to_string())?;
    let value = parse_value(row.value.as_deref())?;

    Ok(normalize(ScoreRecord {
        submission_id,
        metric_id,
        fold_index: row.fold_index,
        value,
        is_valid: row.is_valid.unwrap_or(true),
    }))
}

/// Parse CSV records; row numbers in reports count the header as line 1
pub fn parse_csv(data: &[u8], source: &str) -> Result<ParsedRecords> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);
    let mut parsed = ParsedRecords::default();

    for (row_num, row) in reader.deserialize::<CsvRow>().enumerate() {
        let location = format!("{}:{}", source, row_num + 2);
        match row {
            Ok(row) => match csv_row_to_record(row) {
                Ok(record) => parsed.records.push(record),
                Err(message) => parsed.reject(location, message),
            },
            Err(e) => parsed.reject(location, e.to_string()),
        }
    }

    Ok(parsed)
}

/// Parse a JSON array of records
pub fn parse_json(data: &[u8], source: &str) -> Result<ParsedRecords> {
    let items: Vec<serde_json::Value> = serde_json::from_slice(data)
        .map_err(|e| Error::Parse(format!("{}: expected a JSON array of records: {}", source, e)))?;
    let mut parsed = ParsedRecords::default();

    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<ScoreRecord>(item) {
            Ok(record) => parsed.records.push(normalize(record)),
            Err(e) => parsed.reject(format!("{}[{}]", source, i), e.to_string()),
        }
    }

    Ok(parsed)
}

/// Parse JSON Lines records, skipping blank lines
pub fn parse_jsonl(data: &[u8], source: &str) -> Result<ParsedRecords> {
    let reader = BufReader::new(data);
    let mut parsed = ParsedRecords::default();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            Error::Parse(format!("{}: failed to read line {}: {}", source, line_num + 1, e))
        })?;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<ScoreRecord>(trimmed) {
            Ok(record) => parsed.records.push(normalize(record)),
            Err(e) => parsed.reject(format!("{}:{}", source, line_num + 1), e.to_string()),
        }
    }

    Ok(parsed)
}

/// Parse records in the given format
pub fn parse_records(data: &[u8], format: RecordFormat, source: &str) -> Result<ParsedRecords> {
    match format {
        RecordFormat::Csv => parse_csv(data, source),
        RecordFormat::Json => parse_json(data, source),
        RecordFormat::Jsonl => parse_jsonl(data, source),
    }
}

/// Load a record file, detecting the format from its extension
#[instrument(fields(path = %path.display()))]
pub fn load_records(path: &Path) -> Result<ParsedRecords> {
    let format = RecordFormat::from_extension(path).ok_or_else(|| {
        Error::UnsupportedFormat(format!(
            "Unable to detect format from file extension: {}",
            path.display()
        ))
    })?;

    let data = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let source = path.display().to_string();
    let parsed = parse_records(&data, format, &source)?;
    debug!(
        records = parsed.records.len(),
        malformed = parsed.malformed.len(),
        "Loaded record file"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            RecordFormat::from_extension(Path::new("scores.csv")),
            Some(RecordFormat::Csv)
        );
        assert_eq!(
            RecordFormat::from_extension(Path::new("scores.JSON")),
            Some(RecordFormat::Json)
        );
        assert_eq!(
            RecordFormat::from_extension(Path::new("scores.ndjson")),
            Some(RecordFormat::Jsonl)
        );
        assert_eq!(RecordFormat::from_extension(Path::new("scores.txt")), None);
    }

    #[test]
    fn test_parse_csv() {
        let data = b"submission_id,metric_id,fold_index,value,is_valid\n\
            kit,acc,0,0.9,true\n\
            kit,acc,1,,\n\
            kit,acc,2,nan,\n\
            kit,acc,3,0.5,false\n";
        let parsed = parse_csv(data, "scores.csv").unwrap();

        assert!(parsed.malformed.is_empty());
        assert_eq!(parsed.records.len(), 4);
        assert!(parsed.records[0].is_valid);
        assert_eq!(parsed.records[0].value, 0.9);
        assert!(!parsed.records[1].is_valid);
        assert!(!parsed.records[2].is_valid);
        assert!(!parsed.records[3].is_valid);
    }

    #[test]
    fn test_parse_csv_without_validity_column() {
        let data = b"submission_id,metric_id,fold_index,value\nkit,acc,0,0.75\n";
        let parsed = parse_csv(data, "scores.csv").unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.records[0].is_valid);
    }

    #[test]
    fn test_parse_csv_reports_bad_rows_with_line() {
        let data = b"submission_id,metric_id,fold_index,value\n\
            kit,acc,zero,0.9\n\
            kit,acc,1,high\n\
            kit,acc,2,0.8\n";
        let parsed = parse_csv(data, "scores.csv").unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.malformed.len(), 2);
        match &parsed.malformed[0] {
            RecordError::Malformed { location, .. } => assert_eq!(location, "scores.csv:2"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_json() {
        let data = br#"[
            {"submission_id":"kit","metric_id":"acc","fold_index":0,"value":0.9},
            {"submission_id":"kit","metric_id":"acc","fold_index":1,"value":null},
            {"submission_id":"","metric_id":"acc","fold_index":2,"value":0.1}
        ]"#;
        let parsed = parse_json(data, "scores.json").unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert!(!parsed.records[1].is_valid);
        assert_eq!(parsed.malformed.len(), 1);
    }

    #[test]
    fn test_parse_json_requires_array() {
        assert!(parse_json(b"{}", "scores.json").is_err());
    }

    #[test]
    fn test_parse_jsonl() {
        let data = b"{\"submission_id\":\"kit\",\"metric_id\":\"acc\",\"fold_index\":0,\"value\":0.9}\n\
            \n\
            not json\n\
            {\"submission_id\":\"kit\",\"metric_id\":\"acc\",\"fold_index\":1,\"value\":0.8,\"is_valid\":false}\n";
        let parsed = parse_jsonl(data, "scores.jsonl").unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert!(!parsed.records[1].is_valid);
        assert_eq!(parsed.malformed.len(), 1);
    }
}

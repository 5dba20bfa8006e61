//! Output formatters

use anyhow::Result;
use ramp_leaderboard_domain::{CombinedScore, Leaderboard};
use serde::Serialize;

/// Render one combined score.
///
/// `value ± std` when more than one fold counted, the bare value for a single
/// fold, `-` without any valid fold. Incomplete scores carry `(n/N)`.
pub fn format_score(score: &CombinedScore, precision: usize) -> String {
    let mut text = if !score.has_value() {
        "-".to_string()
    } else if score.n_folds_used > 1 && score.std_dev.is_finite() {
        format!(
            "{:.p$} ± {:.p$}",
            score.value,
            score.std_dev,
            p = precision
        )
    } else {
        format!("{:.p$}", score.value, p = precision)
    };

    if !score.is_complete {
        text.push_str(&format!(" ({}/{})", score.n_folds_used, score.n_folds_expected));
    }
    text
}

/// JSON formatter
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format a value as pretty JSON
    pub fn format<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

/// Plain text formatter
pub struct PlainFormatter;

impl PlainFormatter {
    /// Format a value as indented key/value text
    pub fn format<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        // Convert to JSON first, then pretty-print
        let json = serde_json::to_value(value)?;
        Ok(Self::format_value(&json, 0))
    }

    /// One tab-separated line per row: rank, submission, then every metric
    pub fn leaderboard(board: &Leaderboard, precision: usize) -> String {
        board
            .rows
            .iter()
            .map(|row| {
                let mut fields = vec![row.rank.to_string(), row.submission_id.to_string()];
                fields.extend(board.metrics.iter().map(|metric| match row.score(metric) {
                    Some(score) if score.has_value() => {
                        format!("{:.p$}", score.value, p = precision)
                    }
                    _ => "-".to_string(),
                }));
                if !row.is_complete {
                    fields.push("incomplete".to_string());
                }
                fields.join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_value(value: &serde_json::Value, indent: usize) -> String {
        let indent_str = "  ".repeat(indent);
        match value {
            serde_json::Value::Null => "null".to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(arr) => {
                let items: Vec<String> = arr
                    .iter()
                    .map(|v| format!("{}  - {}", indent_str, Self::format_value(v, indent + 1)))
                    .collect();
                items.join("\n")
            }
            serde_json::Value::Object(obj) => {
                let items: Vec<String> = obj
                    .iter()
                    .map(|(k, v)| {
                        format!("{}{}: {}", indent_str, k, Self::format_value(v, indent + 1))
                    })
                    .collect();
                items.join("\n")
            }
        }
    }
}

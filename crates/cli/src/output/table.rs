//! Table formatting utilities

use super::formatters::format_score;
use ramp_leaderboard_common::datetime::format_datetime_display;
use ramp_leaderboard_domain::{Diagnostic, Leaderboard};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, *};
use std::collections::HashMap;

/// Table formatter
pub struct TableFormatter;

impl TableFormatter {
    /// Create a new table with default styling
    pub fn new() -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    /// Create a simple table with headers and rows
    pub fn simple(headers: Vec<&str>, rows: Vec<Vec<String>>) -> String {
        let mut table = Self::new();
        table.set_header(headers);

        for row in rows {
            table.add_row(row);
        }

        table.to_string()
    }

    /// Render a leaderboard.
    ///
    /// Ranks shared by several rows get a `=` marker. Incomplete rows are
    /// dimmed to yellow when `styled` is set.
    pub fn leaderboard(board: &Leaderboard, precision: usize, styled: bool) -> String {
        let mut table = Self::new();

        let mut header = vec![
            Cell::new("Rank"),
            Cell::new("Submission"),
            Cell::new("Author"),
            Cell::new("Submitted"),
        ];
        header.extend(board.metrics.iter().map(|metric| {
            let cell = Cell::new(metric.as_str());
            if *metric == board.primary_metric {
                cell.add_attribute(Attribute::Bold)
            } else {
                cell
            }
        }));
        header.push(Cell::new("Complete"));
        table.set_header(header);

        let mut group_sizes: HashMap<u32, usize> = HashMap::new();
        for row in &board.rows {
            *group_sizes.entry(row.tie_group_id).or_default() += 1;
        }

        for row in &board.rows {
            let tied = group_sizes.get(&row.tie_group_id).copied().unwrap_or(0) > 1;
            let rank = if tied {
                format!("{}=", row.rank)
            } else {
                row.rank.to_string()
            };

            let mut cells = vec![
                rank,
                row.metadata.display_name.clone(),
                row.metadata.author.clone(),
                row.metadata
                    .timestamp
                    .as_ref()
                    .map(format_datetime_display)
                    .unwrap_or_else(|| "-".to_string()),
            ];
            cells.extend(board.metrics.iter().map(|metric| {
                row.score(metric)
                    .map(|score| format_score(score, precision))
                    .unwrap_or_else(|| "-".to_string())
            }));
            cells.push(if row.is_complete { "✓" } else { "✗" }.to_string());

            let cells: Vec<Cell> = cells
                .into_iter()
                .map(|text| {
                    let cell = Cell::new(text);
                    if styled && !row.is_complete {
                        cell.fg(Color::Yellow)
                    } else {
                        cell
                    }
                })
                .collect();
            table.add_row(cells);
        }

        table.to_string()
    }

    /// Render diagnostics: code, kind, submission, metric and message
    pub fn diagnostics(diagnostics: &[Diagnostic]) -> String {
        let rows = diagnostics
            .iter()
            .map(|d| {
                vec![
                    d.code.clone(),
                    d.kind.clone(),
                    d.submission_id
                        .as_ref()
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    d.metric_id
                        .as_ref()
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    d.message.clone(),
                ]
            })
            .collect();
        Self::simple(vec!["Code", "Kind", "Submission", "Metric", "Message"], rows)
    }
}

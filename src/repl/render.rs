//! Plain-text rendering of session outcomes.

use crate::db::ColumnStat;
use crate::persistence::HistoryEntry;
use crate::results::{ColumnKind, ResultSet, SortDirection};
use crate::session::{GenerateOutcome, RepairOutcome, RunOutcome};

/// Rows printed before the table is cut.
pub const MAX_DISPLAY_ROWS: usize = 200;

/// Cells wider than this are truncated on screen (never in exports).
const MAX_CELL_WIDTH: usize = 40;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let head: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{head}...")
}

fn header_label(name: &str, kind: ColumnKind, sort: Option<SortDirection>) -> String {
    let mut label = match kind {
        ColumnKind::Text => name.to_string(),
        other => format!("{name} ({})", other.label()),
    };
    match sort {
        Some(SortDirection::Ascending) => label.push_str(" ^"),
        Some(SortDirection::Descending) => label.push_str(" v"),
        None => {}
    }
    label
}

/// Renders the result set as an aligned text table.
pub fn render_table(results: &ResultSet, max_rows: usize) -> String {
    let kinds = results.column_kinds();
    let headers: Vec<String> = results
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let sort = (results.sort_column() == Some(i)).then(|| results.sort_direction());
            header_label(name, kinds[i], sort)
        })
        .collect();

    let shown = results.row_count().min(max_rows);
    let cells: Vec<Vec<String>> = (0..shown)
        .map(|r| {
            (0..headers.len())
                .map(|c| truncate(&results.cell(r, c).to_string(), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(c, h)| {
            cells
                .iter()
                .map(|row| row[c].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |row: &[String]| -> String {
        row.iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(shown + 3);
    lines.push(format_row(&headers));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(cells.iter().map(|row| format_row(row)));

    if results.row_count() > shown {
        lines.push(format!("... {} more rows", results.row_count() - shown));
    }
    lines.join("\n")
}

/// Renders the outcome of a run.
pub fn render_run(outcome: &RunOutcome, results: Option<&ResultSet>) -> String {
    match outcome {
        RunOutcome::Empty => "Nothing to run.".to_string(),
        RunOutcome::Blocked(keyword) => {
            format!("Blocked: '{keyword}' statements are not allowed in this workbench.")
        }
        RunOutcome::Rows {
            row_count,
            elapsed_ms,
            ..
        } => {
            let table = results
                .map(|r| render_table(r, MAX_DISPLAY_ROWS))
                .unwrap_or_default();
            let timing = elapsed_ms
                .map(|ms| format!(" in {ms:.2} ms"))
                .unwrap_or_default();
            format!("{table}\n({row_count} rows{timing})")
        }
        RunOutcome::Message { text } => text.clone(),
        RunOutcome::Error { message } => {
            format!("Error: {message}\n(:fix to ask for a correction)")
        }
        RunOutcome::Superseded => "A newer query replaced this one.".to_string(),
    }
}

/// Renders the per-column statistics that came with the last result set.
pub fn render_stats(stats: &[ColumnStat]) -> String {
    if stats.is_empty() {
        return "No column statistics for the current results.".to_string();
    }

    stats
        .iter()
        .map(|stat| {
            let mut lines = vec![
                format!("{} ({})", stat.column, stat.kind),
                format!("  uniques: {}", stat.unique_count),
                format!("  nulls:   {} ({}%)", stat.null_count, stat.null_percentage),
            ];
            if let Some(mean) = stat.mean {
                lines.push(format!("  mean:    {}", (mean * 100.0).round() / 100.0));
            }
            if !stat.top_values.is_empty() {
                let top = stat
                    .top_values
                    .iter()
                    .map(|tv| format!("{} {}%", tv.value, tv.percentage))
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!("  top:     {top}"));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the outcome of a repair; `editor` is the text after the repair.
pub fn render_repair(outcome: &RepairOutcome, editor: &str) -> String {
    match outcome {
        RepairOutcome::NothingToFix => "The editor is empty.".to_string(),
        RepairOutcome::NoRecentError => "No recent error to fix. Run a query first.".to_string(),
        RepairOutcome::Applied { explanation } => {
            let mut text = format!("Fixed SQL (:run to execute):\n{editor}");
            if let Some(explanation) = explanation {
                text.push_str(&format!("\n{explanation}"));
            }
            text
        }
        RepairOutcome::FixUnavailable { explanation } => match explanation {
            Some(explanation) => format!("No fix available: {explanation}"),
            None => "No fix available.".to_string(),
        },
        RepairOutcome::Failed(message) => format!("Fix request failed: {message}"),
    }
}

/// Renders the outcome of SQL generation.
pub fn render_generate(outcome: &GenerateOutcome) -> String {
    match outcome {
        GenerateOutcome::EmptyPrompt => "Ask a question first.".to_string(),
        GenerateOutcome::Generated { sql, .. } => {
            format!("Generated SQL (:run to execute):\n{sql}")
        }
        GenerateOutcome::Invalid { .. } => {
            "Could not generate SQL for that request. Try rephrasing it.".to_string()
        }
        GenerateOutcome::Failed(message) => format!("Generation failed: {message}"),
    }
}

/// Renders history entries with 1-based positions.
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "History is empty.".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{:>3}. [{}] {}", i + 1, e.timestamp, e.query))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders one entry in full.
pub fn render_entry(entry: &HistoryEntry) -> String {
    format!(
        "#{} {}\n{}\n\n{}",
        entry.id, entry.timestamp, entry.query, entry.sql
    )
}

//! Text encodings of a result set.
//!
//! Encoding is pure; writing the text somewhere is the caller's business.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Cell, ResultSet};

/// Supported export encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Header joined by commas, every data cell double-quoted.
    #[default]
    Csv,
    /// Everything joined by `|` with no escaping. A cell containing `|`
    /// shifts the columns of its row.
    Pipe,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pipe => "pipe",
        }
    }

    /// File extension for downloads.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pipe => "txt",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "pipe" | "txt" | "text" => Ok(Self::Pipe),
            _ => Err(format!("Unknown export format: {s}. Expected: csv or pipe")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encodes the result set, in its current display order.
///
/// Lines are separated by `\n`. Newlines inside cells are not escaped beyond
/// the CSV quoting. NULL cells are written as empty strings.
pub fn encode(result: &ResultSet, format: ExportFormat) -> String {
    let (separator, encode_cell): (&str, fn(&Cell) -> String) = match format {
        ExportFormat::Csv => (",", quote_csv),
        ExportFormat::Pipe => ("|", Cell::export_text),
    };

    let mut lines = Vec::with_capacity(result.row_count() + 1);
    lines.push(result.columns().join(separator));
    lines.extend(result.rows().iter().map(|row| {
        row.iter()
            .map(encode_cell)
            .collect::<Vec<_>>()
            .join(separator)
    }));

    lines.join("\n")
}

fn quote_csv(cell: &Cell) -> String {
    format!("\"{}\"", cell.export_text().replace('"', "\"\""))
}

/// File name for a download, e.g. `export_1700000000000.csv`.
pub fn suggested_filename(format: ExportFormat) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("export_{millis}.{}", format.extension())
}

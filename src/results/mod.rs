//! In-memory result set model.
//!
//! Holds the rows of the most recent successful row-returning execution,
//! together with the current display ordering.

mod export;
mod inference;
mod sort;

pub use export::{encode, suggested_filename, ExportFormat};
pub use inference::{infer_column_kind, looks_like_date, ColumnKind};
pub use sort::{CellOrder, SortDirection};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value returned by the database endpoint.
///
/// Only three shapes are distinguished. Dates and timestamps arrive as text;
/// "temporal" is a display hint computed by [`infer_column_kind`], never a
/// stored variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Cell {
    /// NULL value.
    #[default]
    Null,

    /// Any numeric value.
    Number(f64),

    /// Text value.
    Text(String),
}

impl Cell {
    /// Returns true if this cell is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text used by exports and row copies. NULL renders as an empty string.
    pub fn export_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<serde_json::Value> for Cell {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Null,
            serde_json::Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
            serde_json::Value::String(s) => Cell::Text(s),
            serde_json::Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<Cell> for serde_json::Value {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Null => serde_json::Value::Null,
            Cell::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Cell::Text(s) => serde_json::Value::String(s),
        }
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl<T> From<Option<T>> for Cell
where
    T: Into<Cell>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Cell::Null,
        }
    }
}

/// A row of cells. Its length matches the column count of the owning set.
pub type Row = Vec<Cell>;

static NULL: Cell = Cell::Null;

/// Tabular snapshot of one execution plus its current sort state.
///
/// Rectangularity is guaranteed by the endpoint and not re-checked here; a
/// short row reads as NULL in the missing positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Row>,
    sort_column: Option<usize>,
    sort_direction: SortDirection,
}

impl ResultSet {
    /// Creates an unsorted result set.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            sort_column: None,
            sort_direction: SortDirection::Ascending,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The column the rows are currently ordered by, if any.
    pub fn sort_column(&self) -> Option<usize> {
        self.sort_column
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// Returns the cell at `(row, column)`, or NULL when out of range.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// Sorts by `column`.
    ///
    /// Sorting the current sort column again flips the direction; any other
    /// column starts ascending. NULL cells go last in both directions.
    /// Out-of-range columns are ignored.
    pub fn sort(&mut self, column: usize) {
        if column >= self.columns.len() {
            return;
        }

        if self.sort_column == Some(column) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_column = Some(column);
            self.sort_direction = SortDirection::Ascending;
        }

        let mut order = CellOrder::new(self.sort_direction);
        self.rows.sort_by(|a, b| {
            let left = a.get(column).unwrap_or(&NULL);
            let right = b.get(column).unwrap_or(&NULL);
            order.compare(left, right)
        });
    }

    /// Display hint for every column, computed from the first non-null cell.
    pub fn column_kinds(&self) -> Vec<ColumnKind> {
        (0..self.columns.len())
            .map(|i| infer_column_kind(self.rows.iter().map(|r| r.get(i).unwrap_or(&NULL))))
            .collect()
    }

    /// The row at `index` with cells tab-joined, as copied to a clipboard.
    pub fn row_text(&self, index: usize) -> Option<String> {
        self.rows.get(index).map(|row| {
            row.iter()
                .map(Cell::export_text)
                .collect::<Vec<_>>()
                .join("\t")
        })
    }
}

//! Column type hints for rendering.
//!
//! The hint never changes the cells; a "temporal" column still holds text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::Cell;

/// Minimum length (exclusive) a date-like string needs to count as temporal.
/// Keeps short codes such as `2024-01` or `12/05` out.
const MIN_TEMPORAL_LEN: usize = 10;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d %B %Y", "%B %d, %Y"];

/// Rendering hint for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Temporal,
    Text,
}

impl ColumnKind {
    /// Short label used in table headers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Numeric => "#",
            Self::Temporal => "@",
            Self::Text => "T",
        }
    }
}

/// Classifies a column from its first non-null cell.
///
/// A column with no non-null cell is [`ColumnKind::Text`].
pub fn infer_column_kind<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> ColumnKind {
    match cells.into_iter().find(|c| !c.is_null()) {
        Some(Cell::Number(_)) => ColumnKind::Numeric,
        Some(Cell::Text(s)) if s.chars().count() > MIN_TEMPORAL_LEN && looks_like_date(s) => {
            ColumnKind::Temporal
        }
        _ => ColumnKind::Text,
    }
}

/// Returns true if `s` parses as a date or timestamp in a common notation
/// (RFC 3339, RFC 2822, ISO-like date/time).
pub fn looks_like_date(s: &str) -> bool {
    let s = s.trim();

    if DateTime::parse_from_rfc3339(s).is_ok() || DateTime::parse_from_rfc2822(s).is_ok() {
        return true;
    }

    DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
}

//! State-change notifications.

use crate::results::SortDirection;

/// Published by a [`Session`](super::Session) after each state change.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A row-returning run replaced the result set.
    ResultsReplaced { row_count: usize },
    /// The result set was reordered.
    ResultsSorted {
        column: usize,
        direction: SortDirection,
    },
    /// The last error was set (`Some`) or cleared (`None`).
    ErrorChanged(Option<String>),
    /// The history snapshot was reloaded.
    HistoryRefreshed { entries: usize },
    /// A repair or generation overwrote the editor text.
    EditorRewritten { sql: String },
}

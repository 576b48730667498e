//! Wire types for the execution endpoint.
//!
//! The endpoint answers `{sql}` with one of three JSON shapes: an error, a
//! row set (optionally with timing and per-column statistics), or a status
//! message for statements that return no rows.

use serde::{Deserialize, Serialize};

use crate::results::Row;

/// Message used when a successful response carries neither rows nor text.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Success";

/// Request body for the execution endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecuteRequest {
    pub sql: String,
}

/// Raw response body as sent by the endpoint.
///
/// All fields are optional on the wire; [`ExecuteResponse::into_reply`]
/// resolves which shape was meant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecuteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Row>>,

    /// Server-measured execution time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<ColumnStat>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExecuteResponse {
    /// A row-returning response.
    pub fn rows(columns: Vec<&str>, data: Vec<Row>) -> Self {
        Self {
            columns: Some(columns.into_iter().map(String::from).collect()),
            data: Some(data),
            ..Default::default()
        }
    }

    /// A database-reported failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// A status message for a statement without rows.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Default::default()
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, millis: f64) -> Self {
        self.execution_time = Some(millis);
        self
    }

    /// Attaches per-column statistics.
    pub fn with_stats(mut self, stats: Vec<ColumnStat>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Resolves the response shape. An `error` wins over everything; rows
    /// need both `columns` and `data`; anything else is a status message.
    pub fn into_reply(self) -> ExecuteReply {
        if let Some(message) = self.error {
            return ExecuteReply::Error { message };
        }

        match (self.columns, self.data) {
            (Some(columns), Some(rows)) => ExecuteReply::Rows {
                columns,
                rows,
                stats: self.stats.unwrap_or_default(),
                elapsed_ms: self.execution_time,
            },
            _ => ExecuteReply::Message {
                text: self
                    .message
                    .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
            },
        }
    }
}

/// Resolved execution response.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteReply {
    Error {
        message: String,
    },
    Rows {
        columns: Vec<String>,
        rows: Vec<Row>,
        stats: Vec<ColumnStat>,
        elapsed_ms: Option<f64>,
    },
    Message {
        text: String,
    },
}

/// Per-column statistics computed by the endpoint. Passed through to the
/// renderer unmodified.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ColumnStat {
    #[serde(default)]
    pub column: String,

    /// Endpoint's own type label (`numeric`, `date`, `string`).
    #[serde(default, rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub unique_count: u64,

    #[serde(default)]
    pub null_count: u64,

    #[serde(default)]
    pub null_percentage: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    #[serde(default)]
    pub top_values: Vec<TopValue>,
}

/// One entry of a column's value distribution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TopValue {
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    pub percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Cell;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_wins() {
        let body = r#"{"error": "ORA-00001", "execution_time": 3.2}"#;
        let response: ExecuteResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.into_reply(),
            ExecuteReply::Error {
                message: "ORA-00001".to_string()
            }
        );
    }

    #[test]
    fn test_rows_response() {
        let body = r#"{"columns": ["X"], "data": [[1]], "execution_time": 12.5}"#;
        let response: ExecuteResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.into_reply(),
            ExecuteReply::Rows {
                columns: vec!["X".to_string()],
                rows: vec![vec![Cell::Number(1.0)]],
                stats: vec![],
                elapsed_ms: Some(12.5),
            }
        );
    }

    #[test]
    fn test_message_response() {
        let body = r#"{"message": "Table created"}"#;
        let response: ExecuteResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.into_reply(),
            ExecuteReply::Message {
                text: "Table created".to_string()
            }
        );
    }

    #[test]
    fn test_columns_without_data_is_message() {
        let body = r#"{"columns": ["X"]}"#;
        let response: ExecuteResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.into_reply(),
            ExecuteReply::Message {
                text: DEFAULT_SUCCESS_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn test_stats_pass_through() {
        let body = r#"{
            "columns": ["city"],
            "data": [["Paris"], [null]],
            "stats": [{
                "column": "city",
                "type": "string",
                "null_count": 1,
                "null_percentage": 50.0,
                "unique_count": 1,
                "top_values": [{"value": "Paris", "count": 1, "percentage": 50.0}],
                "min": null,
                "max": null,
                "mean": null
            }]
        }"#;
        let response: ExecuteResponse = serde_json::from_str(body).unwrap();
        let ExecuteReply::Rows { stats, rows, .. } = response.into_reply() else {
            panic!("Expected Rows reply");
        };
        assert_eq!(rows[1], vec![Cell::Null]);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].kind, "string");
        assert_eq!(stats[0].null_count, 1);
        assert_eq!(stats[0].mean, None);
        assert_eq!(stats[0].top_values[0].value, "Paris");
    }

    #[test]
    fn test_request_serialization() {
        let request = ExecuteRequest {
            sql: "SELECT 1".to_string(),
        };
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"sql":"SELECT 1"}"#);
    }
}

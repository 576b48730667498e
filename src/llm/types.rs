//! Wire types for the fix-suggestion and SQL-generation collaborators.

use serde::{Deserialize, Serialize};

/// Marker a generator returns for prompts that are not database questions.
pub const INVALID_QUERY: &str = "INVALID_QUERY";

/// Prefix the server puts on generator failures it reports as SQL text.
const ERROR_PREFIX: &str = "Error:";

/// Request body for a fix suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixRequest {
    pub sql: String,
    pub error: String,
}

impl FixRequest {
    pub fn new(sql: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            error: error.into(),
        }
    }
}

/// Response of a fix suggestion. `{}` means no usable fix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Set by the server when the fixer itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FixResponse {
    /// A response carrying a fix.
    pub fn fixed(sql: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            fixed_sql: Some(sql.into()),
            explanation: Some(explanation.into()),
            error: None,
        }
    }

    /// A response without a fix, optionally explaining why.
    pub fn unavailable(explanation: Option<String>) -> Self {
        Self {
            fixed_sql: None,
            explanation,
            error: None,
        }
    }

    /// The suggested statement, if it is non-blank.
    pub fn usable_sql(&self) -> Option<&str> {
        self.fixed_sql
            .as_deref()
            .map(str::trim)
            .filter(|sql| !sql.is_empty())
    }
}

/// Request body for SQL generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub query: String,
}

/// Response of SQL generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub sql: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    pub fn new(sql: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            explanation: explanation.into(),
            error: None,
        }
    }

    /// The generated statement, unless it is empty, an error report, or the
    /// invalid-query marker.
    pub fn usable_sql(&self) -> Option<&str> {
        let sql = self.sql.trim();
        if sql.is_empty() || sql.starts_with(ERROR_PREFIX) || sql == INVALID_QUERY {
            None
        } else {
            Some(sql)
        }
    }
}

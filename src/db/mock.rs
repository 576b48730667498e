//! Mock execution endpoints for testing.
//!
//! Responses are canned per SQL pattern and every call is recorded, so tests
//! can assert how many requests reached the endpoint.

use super::{ExecuteResponse, QueryBackend};
use crate::error::{Result, WorkbenchError};
use crate::results::Cell;
use async_trait::async_trait;
use std::sync::Mutex;

/// A mock endpoint that returns predefined responses.
#[derive(Debug, Default)]
pub struct MockQueryBackend {
    /// Custom response mappings (pattern -> response), checked in order.
    responses: Vec<(String, ExecuteResponse)>,
    /// Every statement received, oldest first.
    calls: Mutex<Vec<String>>,
}

impl MockQueryBackend {
    /// Creates a mock with default responses only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a response mapping.
    ///
    /// When the statement contains `pattern` (case-insensitive), the mock
    /// returns `response`.
    pub fn with_response(mut self, pattern: impl Into<String>, response: ExecuteResponse) -> Self {
        self.responses.push((pattern.into(), response));
        self
    }

    /// Number of statements received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Statements received so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn mock_response(&self, sql: &str) -> ExecuteResponse {
        let sql_lower = sql.to_lowercase();

        for (pattern, response) in &self.responses {
            if sql_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        let head = sql_lower.trim_start();
        if head.starts_with("select") || head.starts_with("with") {
            ExecuteResponse::rows(
                vec!["result"],
                vec![vec![Cell::Text(format!("Mock result for: {}", sql))]],
            )
            .with_execution_time(1.0)
        } else {
            ExecuteResponse::message("Statement executed")
        }
    }
}

#[async_trait]
impl QueryBackend for MockQueryBackend {
    async fn execute(&self, sql: &str) -> Result<ExecuteResponse> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(sql.to_string());
        }
        Ok(self.mock_response(sql))
    }
}

/// An endpoint that is never reachable.
#[derive(Debug, Default)]
pub struct FailingQueryBackend;

#[async_trait]
impl QueryBackend for FailingQueryBackend {
    async fn execute(&self, _sql: &str) -> Result<ExecuteResponse> {
        Err(WorkbenchError::transport("connection refused"))
    }
}

//! Mock collaborators for testing.
//!
//! Provides deterministic responses based on input patterns and records every
//! request so tests can assert how many remote calls were made.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::{FixRequest, FixResponse, GenerateResponse, INVALID_QUERY};
use super::{FixSuggester, SqlGenerator};
use crate::error::{Result, WorkbenchError};

/// Mock fix suggester that returns canned responses keyed on the error text.
#[derive(Debug, Default)]
pub struct MockFixSuggester {
    /// Custom response mappings (error pattern -> response).
    responses: Vec<(String, FixResponse)>,
    requests: Mutex<Vec<FixRequest>>,
    failing: AtomicBool,
}

impl MockFixSuggester {
    /// Creates a mock that answers `{}` to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the request's error contains `pattern`, the mock returns `response`.
    pub fn with_response(mut self, pattern: impl Into<String>, response: FixResponse) -> Self {
        self.responses.push((pattern.into(), response));
        self
    }

    /// Shorthand for a mapping that returns a fix.
    pub fn with_fix(
        self,
        pattern: impl Into<String>,
        fixed_sql: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        self.with_response(pattern, FixResponse::fixed(fixed_sql, explanation))
    }

    /// Makes every subsequent call fail like an unreachable service.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of requests received.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<FixRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl FixSuggester for MockFixSuggester {
    async fn suggest_fix(&self, request: &FixRequest) -> Result<FixResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(WorkbenchError::llm("fix service unavailable"));
        }

        Ok(self
            .responses
            .iter()
            .find(|(pattern, _)| request.error.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_default())
    }
}

/// Mock SQL generator keyed on the natural-language prompt.
#[derive(Debug, Default)]
pub struct MockSqlGenerator {
    /// Custom response mappings (prompt pattern -> response).
    responses: Vec<(String, GenerateResponse)>,
    prompts: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl MockSqlGenerator {
    /// Creates a mock that answers `INVALID_QUERY` to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping, matched case-insensitively.
    pub fn with_response(mut self, pattern: impl Into<String>, response: GenerateResponse) -> Self {
        self.responses.push((pattern.into(), response));
        self
    }

    /// Shorthand for a mapping that returns `sql`.
    pub fn with_sql(self, pattern: impl Into<String>, sql: impl Into<String>) -> Self {
        self.with_response(pattern, GenerateResponse::new(sql, "SQL generated by AI"))
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SqlGenerator for MockSqlGenerator {
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(WorkbenchError::llm("generation service unavailable"));
        }

        let prompt_lower = prompt.to_lowercase();
        Ok(self
            .responses
            .iter()
            .find(|(pattern, _)| prompt_lower.contains(&pattern.to_lowercase()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| GenerateResponse::new(INVALID_QUERY, "")))
    }
}

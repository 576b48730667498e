//! Deterministic fixes applied before any model is consulted.
//!
//! Two Oracle dialect mistakes account for most failures of generated SQL:
//! `LIMIT n` instead of `FETCH FIRST n ROWS ONLY`, and `NOW()` instead of
//! `SYSDATE`. Both are rewritten locally.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::parser::normalize_sql;
use super::types::{FixRequest, FixResponse};
use super::FixSuggester;
use crate::error::Result;

/// Error codes Oracle raises for a `LIMIT` clause.
const LIMIT_ERROR_CODES: [&str; 3] = ["ORA-00933", "ORA-00900", "ORA-03049"];

const LIMIT_EXPLANATION: &str = "Syntax fix: LIMIT replaced with FETCH FIRST (Oracle).";
const NOW_EXPLANATION: &str = "Syntax fix: NOW() replaced with SYSDATE (Oracle).";

fn limit_clause() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bLIMIT\s+(\d+)(\s*;)?").expect("limit pattern is valid"))
}

fn now_call() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bNOW\(\)").expect("now pattern is valid"))
}

/// Applies the local rules to `request`.
///
/// Returns the rewritten statement and the explanation of the last rule
/// that fired, or `None` if no rule applies.
pub fn apply_rules(request: &FixRequest) -> Option<(String, &'static str)> {
    let mut sql = request.sql.trim().to_string();
    let mut explanation = None;

    let limit_error = LIMIT_ERROR_CODES
        .iter()
        .any(|code| request.error.contains(code));
    if limit_error && limit_clause().is_match(&sql) {
        sql = limit_clause()
            .replace_all(&sql, "FETCH FIRST $1 ROWS ONLY")
            .into_owned();
        explanation = Some(LIMIT_EXPLANATION);
    }

    if now_call().is_match(&sql) {
        sql = now_call().replace_all(&sql, "SYSDATE").into_owned();
        explanation = Some(NOW_EXPLANATION);
    }

    explanation.map(|explanation| (normalize_sql(&sql), explanation))
}

/// Fix suggester that tries the local rules, then an optional fallback.
#[derive(Clone, Default)]
pub struct RuleFixer {
    fallback: Option<Arc<dyn FixSuggester>>,
}

impl RuleFixer {
    /// Creates a fixer with no fallback: requests no rule handles get `{}`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consults `fallback` when no rule applies.
    pub fn with_fallback(mut self, fallback: Arc<dyn FixSuggester>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[async_trait]
impl FixSuggester for RuleFixer {
    async fn suggest_fix(&self, request: &FixRequest) -> Result<FixResponse> {
        if let Some((sql, explanation)) = apply_rules(request) {
            debug!("Local rule fixed statement: {explanation}");
            return Ok(FixResponse::fixed(sql, explanation));
        }

        match &self.fallback {
            Some(fallback) => fallback.suggest_fix(request).await,
            None => Ok(FixResponse::default()),
        }
    }
}

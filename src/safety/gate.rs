//! Keyword denylist matching.
//!
//! The gate has no awareness of comments or string literals: a keyword inside
//! `'...'` or `-- ...` is still a whole word and still blocks, and a keyword
//! split by a comment (`UPD/**/ATE`) is not seen.

use regex::Regex;

use super::{BlockedKeyword, Verdict};

/// Whole-word keyword classifier with patterns compiled once at construction.
#[derive(Debug, Clone)]
pub struct SecurityGate {
    patterns: Vec<(BlockedKeyword, Regex)>,
}

impl Default for SecurityGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityGate {
    /// Compiles one word-boundary pattern per denylisted keyword.
    pub fn new() -> Self {
        let patterns = BlockedKeyword::ALL
            .iter()
            .map(|kw| {
                let pattern = format!(r"\b{}\b", kw.as_str());
                // Patterns are built from fixed ASCII keywords.
                let regex = Regex::new(&pattern).expect("keyword pattern is valid");
                (*kw, regex)
            })
            .collect();

        Self { patterns }
    }

    /// Checks a statement, returning the first denylisted keyword in priority order.
    pub fn check(&self, sql: &str) -> Verdict {
        let upper = sql.to_uppercase();

        self.patterns
            .iter()
            .find(|(_, regex)| regex.is_match(&upper))
            .map(|(kw, _)| Verdict::Blocked(*kw))
            .unwrap_or(Verdict::Allowed)
    }
}

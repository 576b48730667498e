//! Cleanup of raw model completions.
//!
//! Models wrap answers in sentence tags and markdown fences, or lead with
//! prose. These helpers reduce a completion to the statement itself.

use regex::Regex;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use std::sync::OnceLock;

fn sentence_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?s>").expect("sentence tag pattern is valid"))
}

// No word boundary: prose such as "Updated query:" matches at UPDATE.
fn statement_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(SELECT|INSERT|UPDATE|DELETE|WITH)").expect("statement pattern is valid")
    })
}

/// Removes markdown code fences, with or without a `sql` tag.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```sql", "").replace("```", "").trim().to_string()
}

/// Reduces a completion to a statement: drops sentence tags and fences,
/// then cuts everything before the first statement keyword. Text with no
/// keyword is returned cleaned but otherwise whole.
pub fn clean_completion(raw: &str) -> String {
    let cleaned = sentence_tags().replace_all(raw.trim(), "");
    let cleaned = strip_code_fences(&cleaned);

    match statement_start().find(&cleaned) {
        Some(m) if m.start() > 0 => cleaned[m.start()..].to_string(),
        _ => cleaned,
    }
}

/// Rewrites a single statement in canonical form (upper-case keywords,
/// single spacing). Anything that does not parse as exactly one statement
/// is returned trimmed and unchanged.
pub fn normalize_sql(sql: &str) -> String {
    let trimmed = sql.trim();
    match Parser::parse_sql(&GenericDialect {}, trimmed) {
        Ok(statements) if statements.len() == 1 => statements[0].to_string(),
        _ => trimmed.to_string(),
    }
}

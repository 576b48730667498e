//! Prompt construction for model requests.

use std::path::Path;
use tracing::warn;

/// Used when no schema document is configured or it cannot be read.
const SCHEMA_UNAVAILABLE: &str = "Schema documentation not available.";

/// Instructions for natural-language to SQL generation.
const GENERATION_PROMPT_TEMPLATE: &str = r#"You are an Oracle SQL expert.
Translate a natural-language request into one valid Oracle SQL query.
Use only the following schema:
{schema}

Rules:
1. Reply ONLY with the SQL code, no explanation.
2. If the request is incoherent, random characters, or unrelated to a database,
   reply EXACTLY: "INVALID_QUERY".
3. Use Oracle SQL syntax (e.g. TO_DATE for dates).
4. Do not quote table or column names.
5. NEVER end the query with a semicolon."#;

/// Completion-style fix prompt. Kept short so small models continue it with
/// the corrected statement rather than commentary.
const FIX_PROMPT_TEMPLATE: &str = r#"/*
 * Database: Oracle SQL
 * Task: Fix the query below based on the error message.
 * Error Message: {error}
 */

-- Original Query:
{sql}

-- Corrected Query (Oracle Syntax):
"#;

/// Reads the schema document, falling back to a placeholder.
pub fn load_schema_doc(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return SCHEMA_UNAVAILABLE.to_string();
    };

    match std::fs::read_to_string(path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Could not read schema document {}: {e}", path.display());
            SCHEMA_UNAVAILABLE.to_string()
        }
    }
}

/// Builds the full generation prompt for `query`.
pub fn build_generation_prompt(schema_doc: &str, query: &str) -> String {
    let system = GENERATION_PROMPT_TEMPLATE.replace("{schema}", schema_doc);
    format!("{system}\n\nUser request: {query}\nSQL:")
}

/// Builds the completion prompt asking for a corrected statement.
pub fn build_fix_prompt(sql: &str, error: &str) -> String {
    FIX_PROMPT_TEMPLATE
        .replace("{error}", error)
        .replace("{sql}", sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fix_prompt_contains_inputs() {
        let prompt = build_fix_prompt("SELECT * FROM t LIMIT 5", "ORA-00933");
        assert!(prompt.contains("Error Message: ORA-00933"));
        assert!(prompt.contains("-- Original Query:\nSELECT * FROM t LIMIT 5\n"));
        assert!(prompt.ends_with("-- Corrected Query (Oracle Syntax):\n"));
    }

    #[test]
    fn test_generation_prompt_embeds_schema_and_query() {
        let prompt = build_generation_prompt("TABLE clients(id, nom)", "all clients");
        assert!(prompt.contains("TABLE clients(id, nom)"));
        assert!(prompt.contains("INVALID_QUERY"));
        assert!(prompt.ends_with("User request: all clients\nSQL:"));
    }

    #[test]
    fn test_schema_doc_missing_path() {
        assert_eq!(load_schema_doc(None), SCHEMA_UNAVAILABLE);

        let dir = tempdir().unwrap();
        assert_eq!(
            load_schema_doc(Some(&dir.path().join("missing.md"))),
            SCHEMA_UNAVAILABLE
        );
    }

    #[test]
    fn test_schema_doc_is_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.md");
        std::fs::write(&path, "# clients").unwrap();
        assert_eq!(load_schema_doc(Some(&path)), "# clients");
    }
}

//! Ollama client implementation.
//!
//! Talks to a local Ollama instance through its completion endpoint
//! (`/api/generate`). Implements both [`FixSuggester`] and [`SqlGenerator`].

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parser::{clean_completion, normalize_sql, strip_code_fences};
use super::prompt::{build_fix_prompt, build_generation_prompt, load_schema_doc};
use super::types::{FixRequest, FixResponse, GenerateResponse, INVALID_QUERY};
use super::{FixSuggester, SqlGenerator};
use crate::error::{Result, WorkbenchError};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// Default Ollama API URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Cleaned fix suggestions shorter than this are treated as no answer.
const MIN_FIX_CHARS: usize = 10;

/// Prompts shorter than this are rejected without a model call.
const MIN_PROMPT_CHARS: usize = 3;

/// Throwaway prompts rejected without a model call.
const PLACEHOLDER_PROMPTS: [&str; 3] = ["abc", "test", "test1"];

const FIX_TEMPERATURE: f32 = 0.1;
const FIX_STOP_SEQUENCES: [&str; 2] = [";", "```"];

/// Ollama client configuration.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API.
    pub base_url: String,
    /// Model to use (e.g., "llama3", "codellama").
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Markdown document describing the schema, embedded in generation prompts.
    pub schema_doc: Option<PathBuf>,
}

impl OllamaConfig {
    /// Creates a new config with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            schema_doc: None,
        }
    }

    /// Sets the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the schema document path.
    pub fn with_schema_doc(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_doc = Some(path.into());
        self
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_MODEL)
    }
}

/// Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
    schema_doc: String,
}

impl OllamaClient {
    /// Creates a new Ollama client with the given configuration.
    ///
    /// The schema document is read once, here.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WorkbenchError::llm(format!("Failed to create HTTP client: {e}")))?;
        let schema_doc = load_schema_doc(config.schema_doc.as_deref());

        Ok(Self {
            config,
            client,
            schema_doc,
        })
    }

    /// Returns the completion API endpoint URL.
    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.config.base_url.trim_end_matches('/'))
    }

    /// Sends one non-streaming completion request and returns the trimmed text.
    async fn complete(&self, prompt: String, options: OllamaOptions) -> Result<String> {
        let request = OllamaRequest {
            model: self.config.model.clone(),
            prompt,
            stream: false,
            options,
        };

        debug!("Sending completion request to Ollama ({})", self.config.model);
        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WorkbenchError::llm("Request timed out. Try again.")
                } else if e.is_connect() {
                    WorkbenchError::llm(
                        "Failed to connect to Ollama. Is it running? Try: ollama serve",
                    )
                } else {
                    WorkbenchError::llm(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WorkbenchError::llm(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(WorkbenchError::llm(format!(
                "Ollama API error ({status}): {body}"
            )));
        }

        let response: OllamaResponse = serde_json::from_str(&body)
            .map_err(|e| WorkbenchError::llm(format!("Failed to parse response: {e}")))?;

        debug!("Raw Ollama completion: {}", response.response);
        Ok(response.response.trim().to_string())
    }
}

/// Turns a raw fix completion into a response.
fn interpret_fix(raw: &str, request: &FixRequest) -> FixResponse {
    let cleaned = clean_completion(raw);
    if cleaned.chars().count() < MIN_FIX_CHARS {
        return FixResponse::unavailable(Some(
            "The model could not identify a correction.".to_string(),
        ));
    }

    FixResponse::fixed(
        normalize_sql(&cleaned),
        format!("Suggested fix for error: {}", request.error),
    )
}

/// Turns a raw generation completion into a response.
fn interpret_generation(raw: &str) -> GenerateResponse {
    if raw.contains(INVALID_QUERY) {
        return GenerateResponse::new(INVALID_QUERY, "Invalid request.");
    }

    let sql = if raw.starts_with("```") {
        strip_code_fences(raw)
    } else {
        raw.trim().to_string()
    };
    GenerateResponse::new(normalize_sql(&sql), "SQL generated by AI")
}

/// Prompts too short or too generic to be worth a model call.
fn is_placeholder_prompt(prompt: &str) -> bool {
    let prompt = prompt.trim();
    prompt.chars().count() < MIN_PROMPT_CHARS
        || PLACEHOLDER_PROMPTS.contains(&prompt.to_lowercase().as_str())
}

#[async_trait]
impl FixSuggester for OllamaClient {
    async fn suggest_fix(&self, request: &FixRequest) -> Result<FixResponse> {
        let options = OllamaOptions {
            temperature: FIX_TEMPERATURE,
            stop: FIX_STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        };
        let raw = self
            .complete(build_fix_prompt(&request.sql, &request.error), options)
            .await?;
        Ok(interpret_fix(&raw, request))
    }
}

#[async_trait]
impl SqlGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse> {
        if is_placeholder_prompt(prompt) {
            debug!("Rejected placeholder prompt without a model call");
            return Ok(GenerateResponse::new(INVALID_QUERY, "Invalid request."));
        }

        let options = OllamaOptions {
            temperature: 0.0,
            stop: Vec::new(),
        };
        let raw = self
            .complete(build_generation_prompt(&self.schema_doc, prompt), options)
            .await?;
        Ok(interpret_generation(&raw))
    }
}

// Ollama API types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_new() {
        let config = OllamaConfig::new("llama3");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.base_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.schema_doc.is_none());
    }

    #[test]
    fn test_config_builders() {
        let config = OllamaConfig::default()
            .with_url("http://custom:11434")
            .with_timeout(120)
            .with_schema_doc("/tmp/schema.md");
        assert_eq!(config.base_url, "http://custom:11434");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.schema_doc, Some(PathBuf::from("/tmp/schema.md")));
    }

    #[test]
    fn test_generate_url() {
        let client = OllamaClient::new(OllamaConfig::default().with_url("http://host:11434/"))
            .unwrap();
        assert_eq!(client.generate_url(), "http://host:11434/api/generate");
    }

    #[test]
    fn test_fix_request_body() {
        let request = OllamaRequest {
            model: "llama3".to_string(),
            prompt: "p".to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: FIX_TEMPERATURE,
                stop: FIX_STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["stop"], serde_json::json!([";", "```"]));
    }

    #[test]
    fn test_generation_options_omit_stop() {
        let options = OllamaOptions {
            temperature: 0.0,
            stop: Vec::new(),
        };
        let json = serde_json::to_value(&options).unwrap();
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn test_interpret_fix_short_answer_is_unavailable() {
        let request = FixRequest::new("SELECT * FROM t", "ORA-00942");
        let response = interpret_fix("</s>``` ok", &request);
        assert!(response.usable_sql().is_none());
        assert!(response.explanation.is_some());
    }

    #[test]
    fn test_interpret_fix_cleans_answer() {
        let request = FixRequest::new("SELECT * FROM client", "ORA-00942");
        let response = interpret_fix("Corrected:\nselect * from clients", &request);
        assert_eq!(response.usable_sql(), Some("SELECT * FROM clients"));
        assert_eq!(
            response.explanation.as_deref(),
            Some("Suggested fix for error: ORA-00942")
        );
    }

    #[test]
    fn test_interpret_generation_invalid_marker() {
        let response = interpret_generation("I think this is INVALID_QUERY.");
        assert_eq!(response.sql, INVALID_QUERY);
        assert!(response.usable_sql().is_none());
    }

    #[test]
    fn test_interpret_generation_strips_fences() {
        let response = interpret_generation("```sql\nselect nom from clients\n```");
        assert_eq!(response.usable_sql(), Some("SELECT nom FROM clients"));
    }

    #[test]
    fn test_placeholder_prompts() {
        assert!(is_placeholder_prompt("ab"));
        assert!(is_placeholder_prompt("  TEST "));
        assert!(is_placeholder_prompt("abc"));
        assert!(!is_placeholder_prompt("all clients in Paris"));
    }

    #[tokio::test]
    async fn test_placeholder_prompt_skips_model() {
        // Nothing listens on this port; a request would fail.
        let client =
            OllamaClient::new(OllamaConfig::default().with_url("http://127.0.0.1:9")).unwrap();
        let response = client.generate("abc").await.unwrap();
        assert_eq!(response.sql, INVALID_QUERY);
    }
}

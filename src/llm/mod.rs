//! AI collaborators for the workbench.
//!
//! Two seams: [`FixSuggester`] repairs a failed statement given the database
//! error, and [`SqlGenerator`] turns a natural-language request into SQL.
//! The HTTP client implements both against a workbench server; this module
//! adds a local rule fixer, a direct Ollama client, and mocks.

pub mod factory;
pub mod mock;
pub mod ollama;
pub mod parser;
pub mod prompt;
pub mod rules;
pub mod types;

pub use factory::{create_collaborators, LlmCollaborators};
pub use mock::{MockFixSuggester, MockSqlGenerator};
pub use ollama::{OllamaClient, OllamaConfig};
pub use rules::RuleFixer;
pub use types::{
    FixRequest, FixResponse, GenerateRequest, GenerateResponse, INVALID_QUERY,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Result;

/// Suggests a corrected statement for a failed one.
///
/// `Ok` with an empty response means "no usable fix"; `Err` means the
/// service could not be reached or answered garbage.
#[async_trait]
pub trait FixSuggester: Send + Sync {
    async fn suggest_fix(&self, request: &FixRequest) -> Result<FixResponse>;
}

/// Generates SQL from a natural-language request.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// The workbench server's own fix and generate endpoints.
    #[default]
    Server,
    /// Local Ollama instance, behind the local fix rules.
    Ollama,
    /// Mock collaborators (no network).
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

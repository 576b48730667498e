//! Collaborator factory.
//!
//! Centralizes provider-specific logic for building the fix suggester and
//! SQL generator the session uses.

use std::sync::Arc;

use crate::client::WorkbenchClient;
use crate::config::LlmConfig;
use crate::error::Result;
use crate::llm::ollama::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use crate::llm::{
    FixSuggester, LlmProvider, MockFixSuggester, MockSqlGenerator, OllamaClient, OllamaConfig,
    RuleFixer, SqlGenerator,
};

/// The AI collaborators of a session.
#[derive(Clone)]
pub struct LlmCollaborators {
    pub fixer: Arc<dyn FixSuggester>,
    pub generator: Arc<dyn SqlGenerator>,
}

/// Builds the collaborators for the configured provider.
///
/// - `server`: the workbench server's own endpoints, which apply the fix
///   rules server-side.
/// - `ollama`: local fix rules in front of a direct Ollama client.
/// - `mock`: local fix rules only; generation always answers `INVALID_QUERY`.
pub fn create_collaborators(
    config: &LlmConfig,
    server: Arc<WorkbenchClient>,
    timeout_secs: u64,
) -> Result<LlmCollaborators> {
    match config.provider {
        LlmProvider::Server => Ok(LlmCollaborators {
            fixer: server.clone(),
            generator: server,
        }),
        LlmProvider::Ollama => {
            let mut ollama_config = OllamaConfig::new(
                config
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            )
            .with_url(
                config
                    .url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            )
            .with_timeout(timeout_secs);
            if let Some(path) = &config.schema_doc {
                ollama_config = ollama_config.with_schema_doc(path);
            }

            let ollama = Arc::new(OllamaClient::new(ollama_config)?);
            Ok(LlmCollaborators {
                fixer: Arc::new(RuleFixer::new().with_fallback(ollama.clone())),
                generator: ollama,
            })
        }
        LlmProvider::Mock => Ok(LlmCollaborators {
            fixer: Arc::new(RuleFixer::new().with_fallback(Arc::new(MockFixSuggester::new()))),
            generator: Arc::new(MockSqlGenerator::new()),
        }),
    }
}

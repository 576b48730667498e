//! Configuration management for the workbench.
//!
//! Handles loading configuration from TOML files and environment variables:
//! the workbench server to talk to, where history lives, and which AI
//! provider answers fix and generation requests.

use crate::error::{Result, WorkbenchError};
use crate::llm::LlmProvider;
use crate::persistence::{default_data_dir, DEFAULT_HISTORY_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default workbench server.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Default request timeout, applied to every remote call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

/// Workbench server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Base URL of the server exposing the `/api` endpoints.
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Parses and validates the server URL.
    pub fn parsed_url(&self) -> Result<Url> {
        let url = Url::parse(&self.url).map_err(|e| {
            WorkbenchError::config(format!("Invalid server URL '{}': {e}", self.url))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(WorkbenchError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        Ok(url)
    }
}

/// Where query history is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    /// The server's `/api/history` endpoints.
    #[default]
    Server,
    /// A local SQLite database.
    Sqlite,
    /// A local JSON file.
    Json,
}

/// History configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    #[serde(default)]
    pub backend: HistoryBackend,

    /// File for the local backends. Defaults to the platform data directory.
    pub path: Option<PathBuf>,

    /// Number of entries the local backends keep.
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::default(),
            path: None,
            limit: default_history_limit(),
        }
    }
}

impl HistoryConfig {
    /// Returns the file a local backend should use.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let file = match self.backend {
            HistoryBackend::Json => "history.json",
            HistoryBackend::Sqlite | HistoryBackend::Server => "history.db",
        };
        Ok(default_data_dir()?.join(file))
    }
}

/// AI provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Model name for the Ollama provider (e.g., "llama3").
    pub model: Option<String>,

    /// Base URL for the Ollama provider.
    pub url: Option<String>,

    /// Markdown schema description embedded in generation prompts.
    pub schema_doc: Option<PathBuf>,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("db-workbench")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| WorkbenchError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Loads the file, then applies environment overrides and `overrides`
    /// (command-line flags) before validating.
    pub fn load(path: Option<&Path>, overrides: impl FnOnce(&mut Config)) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        let mut config = Self::load_from_file(&path)?;
        config.apply_env_overrides();
        overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            WorkbenchError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies `WORKBENCH_URL`, `OLLAMA_URL` and `OLLAMA_MODEL`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary variable lookup.
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("WORKBENCH_URL") {
            self.server.url = url;
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.llm.url = Some(url);
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.llm.model = Some(model);
        }
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.server.parsed_url()?;

        if self.server.timeout_secs == 0 {
            return Err(WorkbenchError::config("server.timeout_secs must be at least 1"));
        }
        if self.history.limit == 0 {
            return Err(WorkbenchError::config("history.limit must be at least 1"));
        }
        Ok(())
    }
}

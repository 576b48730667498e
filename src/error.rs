//! Error types for the workbench.
//!
//! Defines the main error enum used throughout the crate. The session engine
//! never lets these escape its public operations; they are folded into
//! outcome values at that boundary.

use thiserror::Error;

/// Main error type for workbench operations.
#[derive(Error, Debug)]
pub enum WorkbenchError {
    /// Network or decoding failures before a structured response exists.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Failures reported by the remote database endpoint.
    #[error("Remote error: {0}")]
    Remote(String),

    /// History store failures (SQLite, JSON file, remote store).
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Fix-suggestion or SQL-generation failures.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration errors (invalid config file, bad server URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Export errors (nothing to export, unwritable target).
    #[error("Export error: {0}")]
    Export(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkbenchError {
    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a remote error with the given message.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Creates a persistence error with the given message.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an export error with the given message.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "Transport Error",
            Self::Remote(_) => "Remote Error",
            Self::Persistence(_) => "Persistence Error",
            Self::Llm(_) => "LLM Error",
            Self::Config(_) => "Configuration Error",
            Self::Export(_) => "Export Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using WorkbenchError.
pub type Result<T> = std::result::Result<T, WorkbenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_transport() {
        let err = WorkbenchError::transport("connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");
        assert_eq!(err.category(), "Transport Error");
    }

    #[test]
    fn test_error_display_remote() {
        let err = WorkbenchError::remote("ORA-00942: table or view does not exist");
        assert_eq!(
            err.to_string(),
            "Remote error: ORA-00942: table or view does not exist"
        );
        assert_eq!(err.category(), "Remote Error");
    }

    #[test]
    fn test_error_display_persistence() {
        let err = WorkbenchError::persistence("disk full");
        assert_eq!(err.to_string(), "Persistence error: disk full");
        assert_eq!(err.category(), "Persistence Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = WorkbenchError::config("invalid server url");
        assert_eq!(err.to_string(), "Configuration error: invalid server url");
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_display_export() {
        let err = WorkbenchError::export("no rows to export");
        assert_eq!(err.category(), "Export Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WorkbenchError>();
    }
}

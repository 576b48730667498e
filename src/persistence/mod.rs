//! Query history persistence.
//!
//! The history engine only sees the [`HistoryStore`] trait. Stores assign ids
//! and timestamps; callers never do. Three stores ship with the crate: a
//! local SQLite database, a JSON file, and an in-memory store. The HTTP
//! client in [`crate::client`] implements the same trait for a remote server.

mod json_file;
mod memory;
mod migrations;
mod sqlite;

pub use json_file::JsonFileHistoryStore;
pub use memory::MemoryHistoryStore;
pub use sqlite::SqliteHistoryStore;

use crate::error::{Result, WorkbenchError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of entries kept by the local stores unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Timestamp format used by the local stores.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A persisted history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    /// Short label shown in history lists.
    pub query: String,
    /// Full statement text.
    pub sql: String,
    pub timestamp: String,
}

/// Payload of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub query: String,
    pub sql: String,
}

impl NewHistoryEntry {
    pub fn new(query: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sql: sql.into(),
        }
    }
}

/// Trait defining the interface for history stores.
///
/// `list` returns entries newest first.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns every stored entry, newest first.
    async fn list(&self) -> Result<Vec<HistoryEntry>>;

    /// Stores a new entry.
    async fn create(&self, entry: NewHistoryEntry) -> Result<()>;

    /// Deletes the entry with `id`. Deleting a missing id is not an error.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Returns the platform data directory used by the local stores.
///
/// - Linux: `~/.local/share/db-workbench`
/// - macOS: `~/Library/Application Support/db-workbench`
/// - Windows: `%APPDATA%\db-workbench`
pub fn default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| WorkbenchError::persistence("Could not determine data directory"))?;
    Ok(data_dir.join("db-workbench"))
}

/// Ensures parent directories exist for a store path.
fn ensure_parent_dirs(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            WorkbenchError::persistence(format!(
                "Failed to create data directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

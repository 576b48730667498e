//! JSON-file history store.
//!
//! Stores the whole history as one pretty-printed JSON array, newest first,
//! in the same shape the workbench server keeps its `history.json`.

use super::{
    ensure_parent_dirs, HistoryEntry, HistoryStore, NewHistoryEntry, TIMESTAMP_FORMAT,
};
use crate::error::{Result, WorkbenchError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// History store backed by a JSON file.
pub struct JsonFileHistoryStore {
    path: PathBuf,
    limit: usize,
    /// Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl JsonFileHistoryStore {
    /// Creates a store for `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<HistoryEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(WorkbenchError::persistence(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            WorkbenchError::persistence(format!(
                "Invalid history file {}: {e}",
                self.path.display()
            ))
        })
    }

    async fn write(&self, entries: &[HistoryEntry]) -> Result<()> {
        ensure_parent_dirs(&self.path)?;

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| WorkbenchError::persistence(format!("Failed to encode history: {e}")))?;

        tokio::fs::write(&self.path, content).await.map_err(|e| {
            WorkbenchError::persistence(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
    async fn list(&self) -> Result<Vec<HistoryEntry>> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn create(&self, entry: NewHistoryEntry) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;

        let id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        entries.insert(
            0,
            HistoryEntry {
                id,
                query: entry.query,
                sql: entry.sql,
                timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            },
        );
        entries.truncate(self.limit);

        debug!("Writing {} history entries to {}", entries.len(), self.path.display());
        self.write(&entries).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        entries.retain(|e| e.id != id);
        self.write(&entries).await
    }
}

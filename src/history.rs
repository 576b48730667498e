//! Local mirror of the persisted query history.
//!
//! The snapshot is never patched: every mutation goes to the store and is
//! followed by a full reload, so the cache is only eventually consistent.
//! Two appends racing on their reloads can leave one entry out of the
//! snapshot until the next reload.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::error::Result;
use crate::persistence::{HistoryEntry, HistoryStore, NewHistoryEntry, TIMESTAMP_FORMAT};

/// Number of statement characters kept in a history label.
const LABEL_MAX_CHARS: usize = 30;
const LABEL_ELLIPSIS: &str = "...";

/// Builds the history label for a statement: its first 30 characters, plus
/// an ellipsis if anything was cut.
pub fn history_label(sql: &str) -> String {
    let mut chars = sql.chars();
    let head: String = chars.by_ref().take(LABEL_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}{LABEL_ELLIPSIS}")
    } else {
        head
    }
}

/// Parses an entry timestamp written by the local stores or the server.
pub fn parse_timestamp(entry: &HistoryEntry) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&entry.timestamp, TIMESTAMP_FORMAT).ok()
}

/// Ordered snapshot of the history store.
pub struct HistoryCache {
    store: Arc<dyn HistoryStore>,
    snapshot: Vec<HistoryEntry>,
    /// Bumped on every successful reload.
    generation: u64,
}

impl HistoryCache {
    /// Creates an empty cache over `store`. Nothing is fetched until [`load`](Self::load).
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self {
            store,
            snapshot: Vec::new(),
            generation: 0,
        }
    }

    /// Current snapshot, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.snapshot
    }

    /// Number of reloads that replaced the snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Refetches the full history, replacing the snapshot.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn load(&mut self) -> Result<&[HistoryEntry]> {
        match self.store.list().await {
            Ok(entries) => {
                debug!("History reloaded: {} entries", entries.len());
                self.snapshot = entries;
                self.generation += 1;
                Ok(&self.snapshot)
            }
            Err(e) => {
                warn!("History reload failed: {e}");
                Err(e)
            }
        }
    }

    /// Stores a new entry, then reloads.
    pub async fn append(&mut self, label: &str, sql: &str) -> Result<()> {
        self.store.create(NewHistoryEntry::new(label, sql)).await?;
        self.load().await?;
        Ok(())
    }

    /// Deletes an entry at the store, then reloads.
    pub async fn delete(&mut self, id: i64) -> Result<()> {
        self.store.delete(id).await?;
        self.load().await?;
        Ok(())
    }

    /// Looks up a snapshot position. An index captured before a reload may
    /// no longer exist; that is a miss, not an error.
    pub fn open_detail(&self, index: usize) -> Option<&HistoryEntry> {
        self.snapshot.get(index)
    }
}

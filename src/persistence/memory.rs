//! In-memory history store.
//!
//! Used for tests and for sessions where nothing should outlive the process.

use super::{HistoryEntry, HistoryStore, NewHistoryEntry, TIMESTAMP_FORMAT};
use crate::error::{Result, WorkbenchError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// A history store that lives in process memory.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
    next_id: AtomicUsize,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `list` calls received.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `create` calls received.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(WorkbenchError::persistence("history store unavailable"))
        } else {
            Ok(())
        }
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, Vec<HistoryEntry>>> {
        self.entries
            .lock()
            .map_err(|_| WorkbenchError::internal("history store lock poisoned"))
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn list(&self) -> Result<Vec<HistoryEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.entries()?.clone())
    }

    async fn create(&self, entry: NewHistoryEntry) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.entries()?.insert(
            0,
            HistoryEntry {
                id,
                query: entry.query,
                sql: entry.sql,
                timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.check_available()?;
        self.entries()?.retain(|e| e.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_list_delete() {
        let store = MemoryHistoryStore::new();
        store.create(NewHistoryEntry::new("a", "SELECT 1")).await.unwrap();
        store.create(NewHistoryEntry::new("b", "SELECT 2")).await.unwrap();

        let entries = store.list().await.unwrap();
        assert_eq!(entries[0].query, "b");
        assert_eq!(entries[1].id, 1);

        store.delete(1).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.create_calls(), 2);
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = MemoryHistoryStore::new();
        store.set_failing(true);
        assert!(store.list().await.is_err());
        assert!(store.create(NewHistoryEntry::new("a", "b")).await.is_err());

        store.set_failing(false);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let store = MemoryHistoryStore::new();
        tokio_test::block_on(async {
            store.create(NewHistoryEntry::new("a", "SELECT 1")).await.unwrap();
            store.delete(42).await.unwrap();
            assert_eq!(store.list().await.unwrap().len(), 1);
        });
    }
}

//! SQLite-backed history store.
//!
//! Keeps the newest `limit` entries in a local database file.

use super::{ensure_parent_dirs, migrations, HistoryEntry, HistoryStore, NewHistoryEntry};
use crate::error::{Result, WorkbenchError};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

const MAX_RETRY_ATTEMPTS: u32 = 3;
const RETRY_DELAY_MS: u64 = 100;

/// Raw database row for a history entry.
#[derive(Debug, Clone, FromRow)]
struct HistoryEntryRow {
    id: i64,
    query: String,
    sql: String,
    created_at: String,
}

impl From<HistoryEntryRow> for HistoryEntry {
    fn from(row: HistoryEntryRow) -> Self {
        Self {
            id: row.id,
            query: row.query,
            sql: row.sql,
            timestamp: row.created_at,
        }
    }
}

/// History store backed by a SQLite file.
pub struct SqliteHistoryStore {
    pool: SqlitePool,
    db_path: PathBuf,
    limit: usize,
}

impl SqliteHistoryStore {
    /// Opens or creates the history database at `path`.
    ///
    /// A database that cannot be opened is moved aside to `<path>.bak` and
    /// recreated.
    pub async fn open(path: &Path, limit: usize) -> Result<Self> {
        ensure_parent_dirs(path)?;

        match Self::try_open(path, limit).await {
            Ok(store) => Ok(store),
            Err(e) => {
                warn!("Failed to open history database: {e}. Attempting recovery...");
                Self::attempt_recovery(path, limit).await
            }
        }
    }

    /// Attempts to open the database with retries for lock contention.
    async fn try_open(path: &Path, limit: usize) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS * 2u64.pow(attempt)))
                    .await;
            }

            match Self::connect(path).await {
                Ok(pool) => {
                    migrations::run_migrations(&pool).await?;
                    info!("History database opened at {}", path.display());
                    return Ok(Self {
                        pool,
                        db_path: path.to_path_buf(),
                        limit,
                    });
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            WorkbenchError::persistence("Failed to open database after retries")
        }))
    }

    /// Creates a connection pool to the SQLite database.
    async fn connect(path: &Path) -> Result<SqlitePool> {
        let conn_str = format!("sqlite:{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&conn_str)
            .map_err(|e| WorkbenchError::persistence(format!("Invalid database path: {e}")))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| {
                WorkbenchError::persistence(format!("Failed to connect to history database: {e}"))
            })
    }

    /// Attempts to recover from a corrupted database by backing up and recreating.
    async fn attempt_recovery(path: &Path, limit: usize) -> Result<Self> {
        let backup_path = path.with_extension("db.bak");

        if path.exists() {
            std::fs::rename(path, &backup_path).map_err(|e| {
                WorkbenchError::persistence(format!(
                    "Failed to backup corrupted database to {}: {e}",
                    backup_path.display()
                ))
            })?;
            warn!("Backed up corrupted database to {}", backup_path.display());
        }

        Self::try_open(path, limit).await.map_err(|e| {
            WorkbenchError::persistence(format!("Failed to recreate database after backup: {e}"))
        })
    }

    /// Returns the path to the history database.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Prunes entries beyond the retention limit.
    async fn prune(&self) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM query_history
            WHERE id NOT IN (
                SELECT id FROM query_history
                ORDER BY id DESC
                LIMIT ?
            )
            "#,
        )
        .bind(self.limit as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| WorkbenchError::persistence(format!("Failed to prune history: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn list(&self) -> Result<Vec<HistoryEntry>> {
        let rows: Vec<HistoryEntryRow> = sqlx::query_as(
            r#"
            SELECT id, query, sql, created_at
            FROM query_history
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WorkbenchError::persistence(format!("Failed to list history: {e}")))?;

        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    async fn create(&self, entry: NewHistoryEntry) -> Result<()> {
        sqlx::query("INSERT INTO query_history (query, sql) VALUES (?, ?)")
            .bind(&entry.query)
            .bind(&entry.sql)
            .execute(&self.pool)
            .await
            .map_err(|e| WorkbenchError::persistence(format!("Failed to record query: {e}")))?;

        self.prune().await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM query_history WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                WorkbenchError::persistence(format!("Failed to delete history entry: {e}"))
            })?;

        Ok(())
    }
}

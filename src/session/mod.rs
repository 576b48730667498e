//! Session controller.
//!
//! A [`Session`] owns everything one workbench user mutates: the current
//! result set, the last execution error, and the history snapshot. Remote
//! collaborators are shared behind trait objects. No operation returns a
//! [`WorkbenchError`](crate::error::WorkbenchError) for a remote failure;
//! each failure becomes an outcome value.
//!
//! State changes are also published as [`SessionEvent`]s for presentation
//! layers that prefer to subscribe rather than inspect outcomes.

mod events;
mod executor;
mod repair;
mod state;

pub use events::SessionEvent;
pub use executor::{Execution, QueryExecutor};
pub use repair::RepairOutcome;
pub use state::SessionErrorState;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::db::{ColumnStat, ExecuteReply, QueryBackend};
use crate::error::{Result, WorkbenchError};
use crate::history::{history_label, HistoryCache};
use crate::llm::{FixSuggester, SqlGenerator};
use crate::persistence::{HistoryEntry, HistoryStore};
use crate::results::{encode, suggested_filename, ExportFormat, ResultSet};
use crate::safety::{BlockedKeyword, SecurityGate};

/// Message reported for failures that never produced a structured response.
pub const TRANSPORT_ERROR_MESSAGE: &str = "Server error.";

const EVENT_CAPACITY: usize = 64;

/// Result of [`Session::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Blank statement; nothing was sent and nothing changed.
    Empty,
    /// Refused by the security gate; nothing was sent.
    Blocked(BlockedKeyword),
    /// Rows were returned and now form the current result set.
    Rows {
        columns: Vec<String>,
        row_count: usize,
        stats: Vec<ColumnStat>,
        elapsed_ms: Option<f64>,
    },
    /// The statement ran and returned a status message.
    Message { text: String },
    /// The statement failed; the message is now the last error.
    Error { message: String },
    /// A newer run was started before this one completed; its response was
    /// discarded.
    Superseded,
}

/// Result of [`Session::generate`].
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// Blank prompt; nothing was sent.
    EmptyPrompt,
    /// The editor now holds `sql`.
    Generated { sql: String, explanation: String },
    /// The generator did not produce usable SQL.
    Invalid { explanation: String },
    /// The generator could not be reached.
    Failed(String),
}

/// A run that passed [`Session::begin_run`] and holds its sequence ticket.
///
/// Executing it does not borrow the session, so several runs may be in
/// flight at once. Only the most recently issued one is applied.
pub struct PendingRun {
    ticket: u64,
    sql: String,
    executor: QueryExecutor,
}

impl PendingRun {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Performs the gate check and the remote call.
    pub async fn execute(self) -> CompletedRun {
        let execution = self.executor.execute(&self.sql).await;
        CompletedRun {
            ticket: self.ticket,
            sql: self.sql,
            execution,
        }
    }
}

/// A run whose remote call has finished, ready for [`Session::complete_run`].
#[derive(Debug)]
pub struct CompletedRun {
    ticket: u64,
    sql: String,
    execution: Execution,
}

impl CompletedRun {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

/// One user's workbench session.
pub struct Session {
    executor: QueryExecutor,
    fixer: Arc<dyn FixSuggester>,
    generator: Arc<dyn SqlGenerator>,
    history: HistoryCache,
    results: Option<ResultSet>,
    stats: Vec<ColumnStat>,
    errors: SessionErrorState,
    /// Ticket of the most recently issued run.
    issued: u64,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Creates a session with an empty result set and no history loaded.
    pub fn new(
        backend: Arc<dyn QueryBackend>,
        store: Arc<dyn HistoryStore>,
        fixer: Arc<dyn FixSuggester>,
        generator: Arc<dyn SqlGenerator>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            executor: QueryExecutor::new(backend, Arc::new(SecurityGate::new())),
            fixer,
            generator,
            history: HistoryCache::new(store),
            results: None,
            stats: Vec::new(),
            errors: SessionErrorState::new(),
            issued: 0,
            events,
        }
    }

    /// Receives every state change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// The current result set, if any rows-returning run has succeeded.
    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    /// Column statistics that came with the current result set.
    pub fn stats(&self) -> &[ColumnStat] {
        &self.stats
    }

    pub fn last_error(&self) -> Option<&str> {
        self.errors.last_error()
    }

    fn set_error(&mut self, message: &str) {
        if self.errors.set(message) {
            self.emit(SessionEvent::ErrorChanged(Some(message.to_string())));
        }
    }

    fn clear_error(&mut self) {
        if self.errors.clear() {
            self.emit(SessionEvent::ErrorChanged(None));
        }
    }

    /// Runs a statement: gate, one remote call, then state update.
    pub async fn run(&mut self, sql: &str) -> RunOutcome {
        let pending = self.begin_run(sql);
        let completed = pending.execute().await;
        self.complete_run(completed).await
    }

    /// Issues a ticket for `sql`. Blank statements do not take a new ticket,
    /// so they never supersede a run in flight.
    pub fn begin_run(&mut self, sql: &str) -> PendingRun {
        if !sql.trim().is_empty() {
            self.issued += 1;
        }
        PendingRun {
            ticket: self.issued,
            sql: sql.to_string(),
            executor: self.executor.clone(),
        }
    }

    /// Applies a completed run, unless a newer one has been issued since.
    pub async fn complete_run(&mut self, completed: CompletedRun) -> RunOutcome {
        let CompletedRun {
            ticket,
            sql,
            execution,
        } = completed;

        if matches!(execution, Execution::Empty) {
            return RunOutcome::Empty;
        }

        if ticket != self.issued {
            debug!("Discarding run {ticket}; run {} is newer", self.issued);
            return RunOutcome::Superseded;
        }

        match execution {
            Execution::Empty => RunOutcome::Empty,
            Execution::Blocked(keyword) => {
                info!("Blocked statement containing {keyword}");
                self.clear_error();
                RunOutcome::Blocked(keyword)
            }
            Execution::TransportFailed(e) => {
                warn!("Execution request failed: {e}");
                self.set_error(TRANSPORT_ERROR_MESSAGE);
                RunOutcome::Error {
                    message: TRANSPORT_ERROR_MESSAGE.to_string(),
                }
            }
            Execution::Reply(ExecuteReply::Error { message }) => {
                info!("Statement failed: {message}");
                self.set_error(&message);
                RunOutcome::Error { message }
            }
            Execution::Reply(ExecuteReply::Message { text }) => {
                self.clear_error();
                RunOutcome::Message { text }
            }
            Execution::Reply(ExecuteReply::Rows {
                columns,
                rows,
                stats,
                elapsed_ms,
            }) => {
                let row_count = rows.len();
                info!("Statement returned {row_count} rows");

                self.results = Some(ResultSet::new(columns.clone(), rows));
                self.stats = stats.clone();
                self.clear_error();
                self.emit(SessionEvent::ResultsReplaced { row_count });

                self.record_history(&history_label(&sql), &sql).await;

                RunOutcome::Rows {
                    columns,
                    row_count,
                    stats,
                    elapsed_ms,
                }
            }
        }
    }

    /// Appends to history; a failure is logged and otherwise ignored.
    async fn record_history(&mut self, label: &str, sql: &str) {
        match self.history.append(label, sql).await {
            Ok(()) => self.emit(SessionEvent::HistoryRefreshed {
                entries: self.history.entries().len(),
            }),
            Err(e) => warn!("Failed to record history: {e}"),
        }
    }

    /// Asks the generator for SQL. On success the editor text is replaced and
    /// the prompt is recorded in history with the generated statement.
    pub async fn generate(&mut self, prompt: &str, editor: &mut String) -> GenerateOutcome {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return GenerateOutcome::EmptyPrompt;
        }

        let response = match self.generator.generate(prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!("SQL generation failed: {e}");
                return GenerateOutcome::Failed(e.to_string());
            }
        };

        let Some(sql) = response.usable_sql().map(str::to_string) else {
            debug!("Generator returned no usable SQL: {}", response.sql);
            return GenerateOutcome::Invalid {
                explanation: response.explanation,
            };
        };

        *editor = sql.clone();
        self.emit(SessionEvent::EditorRewritten { sql: sql.clone() });
        self.record_history(prompt, &sql).await;

        GenerateOutcome::Generated {
            sql,
            explanation: response.explanation,
        }
    }

    /// Sorts the current results by `column`. Returns false if there is
    /// nothing to sort or the column does not exist.
    pub fn sort(&mut self, column: usize) -> bool {
        let Some(results) = self.results.as_mut() else {
            return false;
        };
        if column >= results.columns().len() {
            return false;
        }

        results.sort(column);
        let direction = results.sort_direction();
        self.emit(SessionEvent::ResultsSorted { column, direction });
        true
    }

    /// Encodes the current results, or `None` if there are no rows.
    pub fn export(&self, format: ExportFormat) -> Option<String> {
        self.results
            .as_ref()
            .filter(|results| !results.is_empty())
            .map(|results| encode(results, format))
    }

    /// Writes the current results to `path`, or to a timestamped file in the
    /// working directory.
    pub async fn export_to(
        &self,
        format: ExportFormat,
        path: Option<PathBuf>,
    ) -> Result<PathBuf> {
        let content = self
            .export(format)
            .ok_or_else(|| WorkbenchError::export("No rows to export."))?;
        let path = path.unwrap_or_else(|| PathBuf::from(suggested_filename(format)));

        tokio::fs::write(&path, content).await.map_err(|e| {
            WorkbenchError::export(format!("Failed to write {}: {e}", path.display()))
        })?;
        info!("Exported {} to {}", format, path.display());
        Ok(path)
    }

    /// A result row as tab-separated text.
    pub fn row_text(&self, index: usize) -> Option<String> {
        self.results.as_ref().and_then(|r| r.row_text(index))
    }

    /// The history snapshot, newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    /// Refetches history from the store.
    pub async fn load_history(&mut self) -> Result<&[HistoryEntry]> {
        let count = self.history.load().await?.len();
        self.emit(SessionEvent::HistoryRefreshed { entries: count });
        Ok(self.history.entries())
    }

    /// Deletes a history entry and reloads.
    pub async fn delete_history(&mut self, id: i64) -> Result<()> {
        self.history.delete(id).await?;
        self.emit(SessionEvent::HistoryRefreshed {
            entries: self.history.entries().len(),
        });
        Ok(())
    }

    /// Looks up a history entry by snapshot position.
    pub fn open_history(&self, index: usize) -> Option<&HistoryEntry> {
        self.history.open_detail(index)
    }
}

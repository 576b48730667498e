//! Query execution behind the security gate.
//!
//! Provides isolated execution that can be tested independently of the
//! session. The executor decides what happened; it never touches session
//! state.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::db::{ExecuteReply, QueryBackend};
use crate::error::WorkbenchError;
use crate::safety::{BlockedKeyword, SecurityGate, Verdict};

/// What a single execution attempt produced.
#[derive(Debug)]
pub enum Execution {
    /// The statement had no content; nothing was sent.
    Empty,
    /// The gate refused the statement; nothing was sent.
    Blocked(BlockedKeyword),
    /// The endpoint answered.
    Reply(ExecuteReply),
    /// No structured response could be obtained.
    TransportFailed(WorkbenchError),
}

/// Runs statements through the gate and, if allowed, the endpoint.
#[derive(Clone)]
pub struct QueryExecutor {
    backend: Arc<dyn QueryBackend>,
    gate: Arc<SecurityGate>,
}

impl QueryExecutor {
    pub fn new(backend: Arc<dyn QueryBackend>, gate: Arc<SecurityGate>) -> Self {
        Self { backend, gate }
    }

    /// Executes `sql`, issuing at most one request.
    pub async fn execute(&self, sql: &str) -> Execution {
        if sql.trim().is_empty() {
            return Execution::Empty;
        }

        if let Verdict::Blocked(keyword) = self.gate.check(sql) {
            debug!("Statement blocked by keyword {keyword}");
            return Execution::Blocked(keyword);
        }

        let start = Instant::now();
        let result = self.backend.execute(sql).await;
        let local_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(response) => {
                let mut reply = response.into_reply();
                // Fall back to the client-side round trip when the endpoint
                // does not report its own timing.
                if let ExecuteReply::Rows { elapsed_ms, .. } = &mut reply {
                    elapsed_ms.get_or_insert(local_ms);
                }
                Execution::Reply(reply)
            }
            Err(e) => Execution::TransportFailed(e),
        }
    }
}

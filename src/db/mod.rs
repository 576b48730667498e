//! Execution endpoint abstraction.
//!
//! The workbench never talks to a database driver directly. Statements are
//! sent to a read-facing execution endpoint behind the [`QueryBackend`]
//! trait, so the HTTP client and test doubles are interchangeable.

mod mock;
mod types;

pub use mock::{FailingQueryBackend, MockQueryBackend};
pub use types::{
    ColumnStat, ExecuteReply, ExecuteRequest, ExecuteResponse, TopValue, DEFAULT_SUCCESS_MESSAGE,
};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for execution endpoints.
///
/// An `Err` means no structured response exists (network failure, unreadable
/// body). A database-reported failure is an `Ok` response carrying `error`.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Sends one statement and returns the endpoint's response.
    async fn execute(&self, sql: &str) -> Result<ExecuteResponse>;
}

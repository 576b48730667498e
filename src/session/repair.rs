//! Repair loop: turns the last execution error into a fix suggestion.
//!
//! Capture is implicit (every failed run sets the last error). Repair needs
//! both editor text and a last error, and an applied fix clears the error,
//! so repairing twice requires a fresh failure in between. A fix is never
//! executed automatically.

use tracing::{info, warn};

use super::{Session, SessionEvent};
use crate::llm::FixRequest;

/// Result of [`Session::repair`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The editor is blank; nothing was sent.
    NothingToFix,
    /// No failed run since the last clear; nothing was sent.
    NoRecentError,
    /// The editor now holds the fixed statement.
    Applied { explanation: Option<String> },
    /// The suggester answered without a usable fix. State is unchanged.
    FixUnavailable { explanation: Option<String> },
    /// The suggester could not be reached. State is unchanged.
    Failed(String),
}

impl Session {
    /// Requests a fix for `editor` and the last error.
    pub async fn repair(&mut self, editor: &mut String) -> RepairOutcome {
        if editor.trim().is_empty() {
            return RepairOutcome::NothingToFix;
        }
        let Some(error) = self.errors.last_error() else {
            return RepairOutcome::NoRecentError;
        };

        let request = FixRequest::new(editor.as_str(), error);
        let response = match self.fixer.suggest_fix(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Fix request failed: {e}");
                return RepairOutcome::Failed(e.to_string());
            }
        };

        let Some(fixed) = response.usable_sql().map(str::to_string) else {
            info!("No usable fix for: {}", request.error);
            return RepairOutcome::FixUnavailable {
                explanation: response.explanation,
            };
        };

        *editor = fixed.clone();
        self.clear_error();
        self.emit(SessionEvent::EditorRewritten { sql: fixed });
        RepairOutcome::Applied {
            explanation: response.explanation,
        }
    }
}

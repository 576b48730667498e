//! Wiring between configuration and a ready [`Session`].
//!
//! Every collaborator is built here once per process, so the rest of the
//! crate only sees trait objects.

use std::sync::Arc;

use tracing::info;

use crate::client::WorkbenchClient;
use crate::config::{Config, HistoryBackend, HistoryConfig};
use crate::error::Result;
use crate::llm::create_collaborators;
use crate::persistence::{HistoryStore, JsonFileHistoryStore, SqliteHistoryStore};
use crate::session::Session;

/// Opens the configured history store.
pub async fn open_history_store(
    config: &HistoryConfig,
    server: Arc<WorkbenchClient>,
) -> Result<Arc<dyn HistoryStore>> {
    match config.backend {
        HistoryBackend::Server => {
            info!("History: server at {}", server.base_url());
            Ok(server)
        }
        HistoryBackend::Sqlite => {
            let path = config.resolved_path()?;
            info!("History: SQLite at {}", path.display());
            Ok(Arc::new(SqliteHistoryStore::open(&path, config.limit).await?))
        }
        HistoryBackend::Json => {
            let path = config.resolved_path()?;
            info!("History: JSON file at {}", path.display());
            Ok(Arc::new(JsonFileHistoryStore::new(path, config.limit)))
        }
    }
}

/// Builds a session from a validated config.
pub async fn build_session(config: &Config) -> Result<Session> {
    let server = Arc::new(WorkbenchClient::from_config(&config.server)?);
    info!("Workbench server: {}", server.base_url());

    let store = open_history_store(&config.history, server.clone()).await?;
    let llm = create_collaborators(&config.llm, server.clone(), config.server.timeout_secs)?;
    info!("AI provider: {}", config.llm.provider);

    Ok(Session::new(server, store, llm.fixer, llm.generator))
}

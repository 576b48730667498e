//! HTTP client for a workbench server.
//!
//! One `reqwest` client implements every collaborator the session needs:
//! execution, fix suggestion, SQL generation, and the history store. The
//! server reports blocked statements and database errors with non-2xx codes
//! and a JSON `{error}` body, so bodies are decoded regardless of status.
//! A body that is not the expected JSON shape is a transport error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::ServerConfig;
use crate::db::{ExecuteRequest, ExecuteResponse, QueryBackend};
use crate::error::{Result, WorkbenchError};
use crate::llm::{
    FixRequest, FixResponse, FixSuggester, GenerateRequest, GenerateResponse, SqlGenerator,
};
use crate::persistence::{HistoryEntry, HistoryStore, NewHistoryEntry};

const EXECUTE_PATH: &str = "api/execute";
const FIX_PATH: &str = "api/fix_sql";
const GENERATE_PATH: &str = "api/generate";
const HISTORY_PATH: &str = "api/history";
const HISTORY_DELETE_PATH: &str = "api/history/delete";

/// Acknowledgement body of the history mutations.
#[derive(Debug, Default, Deserialize)]
struct Ack {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest {
    id: i64,
}

/// Client for the `/api` endpoints of a workbench server.
#[derive(Debug, Clone)]
pub struct WorkbenchClient {
    base: Url,
    client: Client,
}

impl WorkbenchClient {
    /// Creates a client rooted at `base`.
    pub fn new(mut base: Url, timeout: Duration) -> Result<Self> {
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkbenchError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { base, client })
    }

    /// Creates a client from the `[server]` section.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        Self::new(
            config.parsed_url()?,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| WorkbenchError::internal(format!("Invalid endpoint '{path}': {e}")))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;
        decode(response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = self.endpoint(path)?;
        debug!("GET {url}");
        let response = self.client.get(url).send().await.map_err(map_send_error)?;
        decode(response).await
    }
}

fn map_send_error(e: reqwest::Error) -> WorkbenchError {
    if e.is_timeout() {
        WorkbenchError::transport("Request timed out")
    } else if e.is_connect() {
        WorkbenchError::transport(format!("Failed to connect to workbench server: {e}"))
    } else {
        WorkbenchError::transport(format!("Request failed: {e}"))
    }
}

/// Decodes a JSON body whatever the status code.
async fn decode<R: DeserializeOwned>(response: Response) -> Result<R> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| WorkbenchError::transport(format!("Failed to read response: {e}")))?;
    parse_body(status.as_u16(), &body)
}

fn parse_body<R: DeserializeOwned>(status: u16, body: &str) -> Result<R> {
    serde_json::from_str(body).map_err(|e| {
        WorkbenchError::transport(format!("Unexpected response (HTTP {status}): {e}"))
    })
}

#[async_trait]
impl QueryBackend for WorkbenchClient {
    async fn execute(&self, sql: &str) -> Result<ExecuteResponse> {
        self.post_json(EXECUTE_PATH, &ExecuteRequest { sql: sql.to_string() })
            .await
    }
}

#[async_trait]
impl FixSuggester for WorkbenchClient {
    async fn suggest_fix(&self, request: &FixRequest) -> Result<FixResponse> {
        let response: FixResponse = self.post_json(FIX_PATH, request).await?;
        match response.error {
            Some(error) => Err(WorkbenchError::llm(error)),
            None => Ok(response),
        }
    }
}

#[async_trait]
impl SqlGenerator for WorkbenchClient {
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse> {
        let request = GenerateRequest {
            query: prompt.to_string(),
        };
        let response: GenerateResponse = self.post_json(GENERATE_PATH, &request).await?;
        match response.error {
            Some(error) => Err(WorkbenchError::llm(error)),
            None => Ok(response),
        }
    }
}

#[async_trait]
impl HistoryStore for WorkbenchClient {
    async fn list(&self) -> Result<Vec<HistoryEntry>> {
        self.get_json(HISTORY_PATH)
            .await
            .map_err(|e| WorkbenchError::persistence(format!("Failed to load history: {e}")))
    }

    async fn create(&self, entry: NewHistoryEntry) -> Result<()> {
        let ack: Ack = self
            .post_json(HISTORY_PATH, &entry)
            .await
            .map_err(|e| WorkbenchError::persistence(format!("Failed to save history: {e}")))?;
        ack_result(ack)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let ack: Ack = self
            .post_json(HISTORY_DELETE_PATH, &DeleteRequest { id })
            .await
            .map_err(|e| {
                WorkbenchError::persistence(format!("Failed to delete history entry: {e}"))
            })?;
        ack_result(ack)
    }
}

fn ack_result(ack: Ack) -> Result<()> {
    match ack.error {
        Some(error) => Err(WorkbenchError::persistence(error)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ExecuteReply;
    use pretty_assertions::assert_eq;

    fn client(base: &str) -> WorkbenchClient {
        WorkbenchClient::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_root() {
        let client = client("http://127.0.0.1:5000");
        assert_eq!(
            client.endpoint(EXECUTE_PATH).unwrap().as_str(),
            "http://127.0.0.1:5000/api/execute"
        );
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = client("https://tools.example.com/workbench");
        assert_eq!(client.base_url().path(), "/workbench/");
        assert_eq!(
            client.endpoint(HISTORY_DELETE_PATH).unwrap().as_str(),
            "https://tools.example.com/workbench/api/history/delete"
        );
    }

    #[test]
    fn test_parse_error_body_with_forbidden_status() {
        let response: ExecuteResponse = parse_body(
            403,
            r#"{"error": "Security: 'DROP' is not allowed in this editor."}"#,
        )
        .unwrap();
        assert_eq!(
            response.into_reply(),
            ExecuteReply::Error {
                message: "Security: 'DROP' is not allowed in this editor.".to_string()
            }
        );
    }

    #[test]
    fn test_parse_non_json_is_transport_error() {
        let err = parse_body::<ExecuteResponse>(502, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.category(), "Transport Error");
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_parse_wrong_shape_is_transport_error() {
        let err = parse_body::<Vec<HistoryEntry>>(200, r#"{"status": "ok"}"#).unwrap_err();
        assert_eq!(err.category(), "Transport Error");
    }

    #[test]
    fn test_ack_result() {
        assert!(ack_result(Ack::default()).is_ok());
        let err = ack_result(Ack {
            error: Some("missing id".to_string()),
        })
        .unwrap_err();
        assert_eq!(err.category(), "Persistence Error");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let client = client("http://127.0.0.1:9");
        let err = client.execute("SELECT 1 FROM dual").await.unwrap_err();
        assert_eq!(err.category(), "Transport Error");
    }
}

//! Integration tests for the HTTP client against a loopback server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use db_workbench::client::WorkbenchClient;
use db_workbench::llm::{FixSuggester, SqlGenerator};
use db_workbench::persistence::HistoryStore;
use db_workbench::repl::render_run;
use db_workbench::session::{
    GenerateOutcome, RepairOutcome, RunOutcome, Session, TRANSPORT_ERROR_MESSAGE,
};
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

/// A request as seen by the fake server.
#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    body: String,
}

type Handler = Arc<dyn Fn(&Seen) -> (u16, String) + Send + Sync>;

struct FakeServer {
    url: Url,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl FakeServer {
    async fn start(handler: impl Fn(&Seen) -> (u16, String) + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);

        let log = seen.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let handler = handler.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    serve(stream, handler, log).await;
                });
            }
        });

        Self {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            seen,
        }
    }

    fn client(&self) -> Arc<WorkbenchClient> {
        Arc::new(WorkbenchClient::new(self.url.clone(), Duration::from_secs(5)).unwrap())
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

async fn serve(mut stream: TcpStream, handler: Handler, log: Arc<Mutex<Vec<Seen>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let end = buf.len().min(header_end + length);
    let request = Seen {
        method: request_line.next().unwrap_or_default().to_string(),
        path: request_line.next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[header_end..end]).to_string(),
    };

    let (status, body) = handler(&request);
    log.lock().unwrap().push(request);

    let response = format!(
        "HTTP/1.1 {status} Status\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Routes a request the way a small workbench server would.
fn workbench_routes(request: &Seen) -> (u16, String) {
    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/api/execute") if request.body.contains("LIMIT") => (
            500,
            r#"{"error": "ORA-00933: SQL command not properly ended"}"#.to_string(),
        ),
        ("POST", "/api/execute") => (
            200,
            r#"{"columns": ["ID", "NOM"], "data": [[1, "Dupont"], [2, null]],
                "execution_time": 12.5,
                "stats": [{"column": "ID", "type": "numeric",
                           "unique_count": 2, "null_count": 0}]}"#
                .to_string(),
        ),
        ("POST", "/api/fix_sql") => (
            200,
            r#"{"fixed_sql": "SELECT * FROM clients FETCH FIRST 5 ROWS ONLY",
                "explanation": "Oracle has no LIMIT"}"#
                .to_string(),
        ),
        ("POST", "/api/generate") => (
            500,
            r#"{"error": "Ollama service unavailable"}"#.to_string(),
        ),
        ("POST", "/api/history") => (200, r#"{"status": "ok"}"#.to_string()),
        ("GET", "/api/history") => (
            200,
            r#"[{"id": 7, "query": "SELECT * FROM clients", "sql": "SELECT * FROM clients",
                 "timestamp": "2024-01-15 10:30:00"}]"#
                .to_string(),
        ),
        ("POST", "/api/history/delete") => (200, r#"{"status": "ok"}"#.to_string()),
        _ => (404, r#"{"error": "Not found"}"#.to_string()),
    }
}

fn session_over(client: Arc<WorkbenchClient>) -> Session {
    Session::new(client.clone(), client.clone(), client.clone(), client)
}

#[tokio::test]
async fn test_run_rows_over_http_records_history() {
    let server = FakeServer::start(workbench_routes).await;
    let mut session = session_over(server.client());

    let outcome = session.run("SELECT * FROM clients").await;
    match &outcome {
        RunOutcome::Rows {
            columns,
            row_count,
            stats,
            elapsed_ms,
        } => {
            assert_eq!(columns, &vec!["ID".to_string(), "NOM".to_string()]);
            assert_eq!(*row_count, 2);
            assert_eq!(stats[0].unique_count, 2);
            assert_eq!(*elapsed_ms, Some(12.5));
        }
        other => panic!("Expected rows, got {other:?}"),
    }
    assert!(render_run(&outcome, session.results()).contains("Dupont"));

    let seen = server.seen();
    assert_eq!(seen[0].path, "/api/execute");
    assert_eq!(seen[0].body, r#"{"sql":"SELECT * FROM clients"}"#);
    assert!(seen
        .iter()
        .any(|r| r.method == "POST" && r.path == "/api/history"));
    assert_eq!(session.history()[0].id, 7);
}

#[tokio::test]
async fn test_error_status_body_becomes_last_error_and_fix_applies() {
    let server = FakeServer::start(workbench_routes).await;
    let mut session = session_over(server.client());

    let mut editor = String::from("SELECT * FROM clients LIMIT 5");
    let outcome = session.run(&editor.clone()).await;
    assert_eq!(
        outcome,
        RunOutcome::Error {
            message: "ORA-00933: SQL command not properly ended".to_string()
        }
    );

    let repair = session.repair(&mut editor).await;
    assert_eq!(
        repair,
        RepairOutcome::Applied {
            explanation: Some("Oracle has no LIMIT".to_string())
        }
    );
    assert_eq!(editor, "SELECT * FROM clients FETCH FIRST 5 ROWS ONLY");

    let fix_request = server
        .seen()
        .into_iter()
        .find(|r| r.path == "/api/fix_sql")
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&fix_request.body).unwrap();
    assert_eq!(body["sql"], "SELECT * FROM clients LIMIT 5");
    assert_eq!(body["error"], "ORA-00933: SQL command not properly ended");
}

#[tokio::test]
async fn test_generate_error_field_is_failure() {
    let server = FakeServer::start(workbench_routes).await;
    let client = server.client();

    let err = client.generate("all clients").await.unwrap_err();
    assert_eq!(err.category(), "LLM Error");

    let mut session = session_over(client);
    let mut editor = String::new();
    assert!(matches!(
        session.generate("all clients", &mut editor).await,
        GenerateOutcome::Failed(_)
    ));
    assert!(editor.is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_generic_server_error() {
    let server = FakeServer::start(|_| (502, "<html>Bad Gateway</html>".to_string())).await;
    let mut session = session_over(server.client());

    let outcome = session.run("SELECT 1 FROM dual").await;
    assert_eq!(
        outcome,
        RunOutcome::Error {
            message: TRANSPORT_ERROR_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn test_history_endpoints() {
    let server = FakeServer::start(workbench_routes).await;
    let client = server.client();

    let entries = client.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].timestamp, "2024-01-15 10:30:00");

    client.delete(7).await.unwrap();
    let delete = server
        .seen()
        .into_iter()
        .find(|r| r.path == "/api/history/delete")
        .unwrap();
    assert_eq!(delete.body, r#"{"id":7}"#);
}

#[tokio::test]
async fn test_fix_request_body_shape() {
    let server = FakeServer::start(workbench_routes).await;
    let client = server.client();

    let response = client
        .suggest_fix(&db_workbench::llm::FixRequest::new("SELECT 1 LIMIT 1", "ORA-00933"))
        .await
        .unwrap();
    assert_eq!(
        response.usable_sql(),
        Some("SELECT * FROM clients FETCH FIRST 5 ROWS ONLY")
    );
}

//! End-to-end session flows over mocks and a real local store.

use std::sync::Arc;

use db_workbench::db::{ExecuteResponse, MockQueryBackend};
use db_workbench::llm::{MockSqlGenerator, RuleFixer};
use db_workbench::persistence::{HistoryStore, JsonFileHistoryStore};
use db_workbench::results::{Cell, ExportFormat};
use db_workbench::session::{GenerateOutcome, RepairOutcome, RunOutcome, Session};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn backend() -> MockQueryBackend {
    MockQueryBackend::new()
        .with_response(
            "limit 5",
            ExecuteResponse::error("ORA-00933: SQL command not properly ended"),
        )
        .with_response(
            "clients",
            ExecuteResponse::rows(
                vec!["ID", "NOM", "CREATED_AT"],
                vec![
                    vec![Cell::from(3), Cell::from("Martin"), Cell::from("2024-02-01")],
                    vec![Cell::from(1), Cell::from("Dupont"), Cell::Null],
                    vec![Cell::from(2), Cell::from("Bernard"), Cell::from("2023-12-24")],
                ],
            )
            .with_execution_time(4.0),
        )
}

#[tokio::test]
async fn test_fail_repair_rerun_flow_with_rule_fixer() {
    let dir = tempdir().unwrap();
    let store = Arc::new(JsonFileHistoryStore::new(dir.path().join("history.json"), 50));
    let backend = Arc::new(backend());
    let mut session = Session::new(
        backend.clone(),
        store.clone(),
        Arc::new(RuleFixer::new()),
        Arc::new(MockSqlGenerator::new()),
    );

    let mut editor = String::from("SELECT * FROM clients LIMIT 5");
    let outcome = session.run(&editor.clone()).await;
    assert!(matches!(outcome, RunOutcome::Error { .. }));
    assert!(store.list().await.unwrap().is_empty());

    let repair = session.repair(&mut editor).await;
    assert!(matches!(repair, RepairOutcome::Applied { .. }));
    assert_eq!(editor, "SELECT * FROM clients FETCH FIRST 5 ROWS ONLY");
    assert_eq!(session.last_error(), None);

    let outcome = session.run(&editor.clone()).await;
    assert!(matches!(outcome, RunOutcome::Rows { row_count: 3, .. }));
    assert_eq!(backend.call_count(), 2);

    let stored = store.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sql, "SELECT * FROM clients FETCH FIRST 5 ROWS ONLY");
    assert_eq!(stored[0].query, "SELECT * FROM clients FETCH FI...");
}

#[tokio::test]
async fn test_sort_then_export_follows_display_order() {
    let dir = tempdir().unwrap();
    let mut session = Session::new(
        Arc::new(backend()),
        Arc::new(JsonFileHistoryStore::new(dir.path().join("history.json"), 50)),
        Arc::new(RuleFixer::new()),
        Arc::new(MockSqlGenerator::new()),
    );

    session.run("SELECT * FROM clients").await;
    assert!(session.sort(2));

    assert_eq!(
        session.export(ExportFormat::Pipe).unwrap(),
        "ID|NOM|CREATED_AT\n2|Bernard|2023-12-24\n3|Martin|2024-02-01\n1|Dupont|"
    );
    assert_eq!(
        session.export(ExportFormat::Csv).unwrap().lines().nth(1),
        Some(r#""2","Bernard","2023-12-24""#)
    );
}

#[tokio::test]
async fn test_generated_sql_is_recorded_with_prompt_label() {
    let dir = tempdir().unwrap();
    let store = Arc::new(JsonFileHistoryStore::new(dir.path().join("history.json"), 50));
    let mut session = Session::new(
        Arc::new(backend()),
        store.clone(),
        Arc::new(RuleFixer::new()),
        Arc::new(MockSqlGenerator::new().with_sql("clients", "SELECT * FROM clients")),
    );

    let mut editor = String::new();
    let outcome = session
        .generate("show me every client", &mut editor)
        .await;
    assert!(matches!(outcome, GenerateOutcome::Generated { .. }));

    let stored = store.list().await.unwrap();
    assert_eq!(stored[0].query, "show me every client");
    assert_eq!(stored[0].sql, "SELECT * FROM clients");
}

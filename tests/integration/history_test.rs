//! Integration tests for the local history stores.

use std::sync::Arc;

use db_workbench::history::{parse_timestamp, HistoryCache};
use db_workbench::persistence::{
    HistoryStore, JsonFileHistoryStore, NewHistoryEntry, SqliteHistoryStore,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

async fn fill(store: &dyn HistoryStore, count: usize) {
    for i in 0..count {
        store
            .create(NewHistoryEntry::new(format!("q{i}"), format!("SELECT {i} FROM dual")))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_sqlite_history_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.db");

    let store = SqliteHistoryStore::open(&path, 50).await.unwrap();
    fill(&store, 2).await;
    store.close().await;

    let reopened = SqliteHistoryStore::open(&path, 50).await.unwrap();
    let entries = reopened.list().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].query, "q1");
    assert!(parse_timestamp(&entries[0]).is_some());
    reopened.close().await;
}

#[tokio::test]
async fn test_json_history_limit_and_unique_ids_after_delete() {
    let dir = tempdir().unwrap();
    let store = JsonFileHistoryStore::new(dir.path().join("history.json"), 3);

    fill(&store, 4).await;
    let entries = store.list().await.unwrap();
    let labels: Vec<&str> = entries.iter().map(|e| e.query.as_str()).collect();
    assert_eq!(labels, vec!["q3", "q2", "q1"]);

    // Deleting the newest entry must not let the next id collide.
    let newest = entries[0].id;
    store.delete(newest).await.unwrap();
    store
        .create(NewHistoryEntry::new("again", "SELECT 9 FROM dual"))
        .await
        .unwrap();

    let entries = store.list().await.unwrap();
    let mut ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), entries.len());
    assert_eq!(entries[0].query, "again");
}

#[tokio::test]
async fn test_json_file_is_plain_array() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    let store = JsonFileHistoryStore::new(&path, 50);
    fill(&store, 1).await;

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let first = &raw.as_array().unwrap()[0];
    assert_eq!(first["query"], "q0");
    assert_eq!(first["sql"], "SELECT 0 FROM dual");
    assert!(first["id"].is_i64());
    assert!(first["timestamp"].is_string());
}

#[tokio::test]
async fn test_cache_reloads_after_every_mutation() {
    let dir = tempdir().unwrap();
    let store = Arc::new(
        SqliteHistoryStore::open(&dir.path().join("history.db"), 50)
            .await
            .unwrap(),
    );
    let mut cache = HistoryCache::new(store.clone());
    assert!(cache.entries().is_empty());

    cache.append("first", "SELECT 1 FROM dual").await.unwrap();
    cache.append("second", "SELECT 2 FROM dual").await.unwrap();
    assert_eq!(cache.entries().len(), 2);
    assert_eq!(cache.generation(), 2);

    // Writes from another handle only appear after a reload.
    store
        .create(NewHistoryEntry::new("external", "SELECT 3 FROM dual"))
        .await
        .unwrap();
    assert_eq!(cache.entries().len(), 2);
    cache.load().await.unwrap();
    assert_eq!(cache.open_detail(0).unwrap().query, "external");

    let id = cache.open_detail(2).unwrap().id;
    cache.delete(id).await.unwrap();
    assert_eq!(cache.entries().len(), 2);
    assert!(cache.open_detail(2).is_none());
}

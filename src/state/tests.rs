//! Tests for state types and StateManager

use super::*;
use serde_json::json;
use tempfile::tempdir;

// ============================================================================
// State Type Tests
// ============================================================================

#[test]
fn test_state_default() {
    let state = State::new();
    assert!(state.streams.is_empty());
    assert!(state.get_cursor("conversation_export").is_none());
}

#[test]
fn test_state_native_cursor_values() {
    let mut state = State::new();
    state.set_cursor("conversation_export", json!(1_675_209_600_000_i64));
    state.set_cursor("message_export", json!("2023-02-01"));

    let text = serde_json::to_string(&state).unwrap();
    assert_eq!(
        text,
        r#"{"streams":{"conversation_export":{"cursor":1675209600000},"message_export":{"cursor":"2023-02-01"}}}"#
    );

    let restored: State = serde_json::from_str(&text).unwrap();
    assert_eq!(restored, state);
}

// ============================================================================
// StateManager Tests
// ============================================================================

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
}

#[test]
fn test_state_manager_from_file_path() {
    let manager = StateManager::from_file("/nonexistent-dir/export-state.json").unwrap();
    assert!(!manager.is_in_memory());
    assert_eq!(manager.path().to_str().unwrap(), "/nonexistent-dir/export-state.json");
}

#[tokio::test]
async fn test_get_set_cursor() {
    let manager = StateManager::in_memory();
    assert!(manager.get_cursor("message_export").await.is_none());

    manager
        .set_cursor("message_export", json!("2023-01-01"))
        .await
        .unwrap();
    assert_eq!(
        manager.get_cursor("message_export").await,
        Some(json!("2023-01-01"))
    );
}

#[tokio::test]
async fn test_from_json() {
    let manager =
        StateManager::from_json(r#"{"streams": {"message_export": {"cursor": "2023-03-01"}}}"#)
            .unwrap();
    assert!(manager.is_in_memory());
    assert_eq!(
        manager.get_cursor("message_export").await,
        Some(json!("2023-03-01"))
    );
}

#[test]
fn test_from_json_invalid() {
    let err = StateManager::from_json("{not json").unwrap_err();
    assert!(err.to_string().contains("Failed to parse state"));
}

#[tokio::test]
async fn test_from_json_empty_is_empty_state() {
    let manager = StateManager::from_json("  ").unwrap();
    assert!(manager.get_cursor("message_export").await.is_none());
}

#[tokio::test]
async fn test_file_persistence_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::from_file(&path).unwrap();
    manager
        .set_cursor("conversation_export", json!(1_672_531_200_000_i64))
        .await
        .unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let reloaded = StateManager::from_file(&path).unwrap();
    assert_eq!(
        reloaded.get_cursor("conversation_export").await,
        Some(json!(1_672_531_200_000_i64))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_from_clones_all_persist() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let manager = StateManager::from_file(&path).unwrap();

    let writers: Vec<_> = ["conversation_export", "message_export"]
        .into_iter()
        .map(|stream| {
            let store = manager.clone();
            tokio::spawn(async move {
                for i in 0..200_i64 {
                    store.set_cursor(stream, json!(i)).await?;
                }
                Ok::<_, crate::error::Error>(())
            })
        })
        .collect();

    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    let reloaded = StateManager::from_file(&path).unwrap();
    assert_eq!(reloaded.get_cursor("conversation_export").await, Some(json!(199)));
    assert_eq!(reloaded.get_cursor("message_export").await, Some(json!(199)));
    assert!(!path.with_extension("tmp").exists());
}

#[tokio::test]
async fn test_failed_write_keeps_previous_cursor() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{"streams":{"message_export":{"cursor":"2023-01-01"}}}"#).unwrap();
    let manager = StateManager::from_file(&path).unwrap();

    // The temp file cannot be created once the directory is gone
    drop(dir);

    let err = manager
        .set_cursor("message_export", json!("2023-02-01"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to write state file"));
    assert_eq!(
        manager.get_cursor("message_export").await,
        Some(json!("2023-01-01"))
    );

    manager
        .set_cursor("conversation_export", json!(1))
        .await
        .unwrap_err();
    assert!(manager.get_cursor("conversation_export").await.is_none());
}

#[tokio::test]
async fn test_from_file_missing_starts_empty() {
    let dir = tempdir().unwrap();
    let manager = StateManager::from_file(dir.path().join("absent.json")).unwrap();
    assert!(manager.get_cursor("message_export").await.is_none());
}

#[tokio::test]
async fn test_clone_shares_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();

    clone.set_cursor("s", json!("2023-01-01")).await.unwrap();
    assert_eq!(manager.get_cursor("s").await, Some(json!("2023-01-01")));
}

#[tokio::test]
async fn test_checkpoint_store_impl() {
    let store: std::sync::Arc<dyn CheckpointStore> = std::sync::Arc::new(StateManager::in_memory());
    assert!(store.load("s").await.unwrap().is_none());
    store.commit("s", json!(5)).await.unwrap();
    assert_eq!(store.load("s").await.unwrap(), Some(json!(5)));
}

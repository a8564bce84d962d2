//! State manager implementation
//!
//! Provides in-memory or file-based state persistence with atomic writes.

use super::types::State;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Durable storage for per-stream checkpoints
///
/// Implementations only store and return values. Ordering rules are
/// enforced by the cursor manager before `commit` is called.
#[async_trait]
pub trait CheckpointStore: Send + Sync + Debug {
    /// Last committed cursor for a stream
    async fn load(&self, stream: &str) -> Result<Option<Value>>;

    /// Durably record a new cursor for a stream
    async fn commit(&self, stream: &str, cursor: Value) -> Result<()>;
}

/// State manager for persisting and loading state
#[derive(Debug)]
pub struct StateManager {
    /// Path to the state file (empty for in-memory mode)
    path: PathBuf,
    /// Current state (cached)
    state: Arc<RwLock<State>>,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(State::new())),
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            parse_state(&contents)?
        } else {
            State::new()
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Create an in-memory state manager from inline JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(parse_state(json)?)),
        })
    }

    /// Get cursor for a stream
    pub async fn get_cursor(&self, stream: &str) -> Option<Value> {
        let state = self.state.read().await;
        state.get_cursor(stream).cloned()
    }

    /// Set cursor for a stream and persist
    ///
    /// The write lock is held until the file is renamed into place, so
    /// clones sharing this manager write one at a time. If the write fails
    /// the previous cursor is restored and memory keeps matching the file.
    pub async fn set_cursor(&self, stream: &str, cursor: Value) -> Result<()> {
        let mut state = self.state.write().await;
        let previous = state.get_cursor(stream).cloned();
        state.set_cursor(stream, cursor);

        if let Err(err) = self.write_file(&state).await {
            match previous {
                Some(previous) => state.set_cursor(stream, previous),
                None => {
                    state.streams.remove(stream);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    /// Write `state` to the state file; callers hold the write lock
    async fn write_file(&self, state: &State) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let contents = serde_json::to_string_pretty(state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        Ok(())
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

#[async_trait]
impl CheckpointStore for StateManager {
    async fn load(&self, stream: &str) -> Result<Option<Value>> {
        Ok(self.get_cursor(stream).await)
    }

    async fn commit(&self, stream: &str, cursor: Value) -> Result<()> {
        self.set_cursor(stream, cursor).await
    }
}

fn parse_state(json: &str) -> Result<State> {
    if json.trim().is_empty() {
        return Ok(State::new());
    }
    serde_json::from_str(json).map_err(|e| Error::state(format!("Failed to parse state: {e}")))
}

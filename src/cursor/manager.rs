//! Per-stream cursor manager

use super::window::{windows, WindowConfig, Windows};
use crate::error::{Error, Result};
use crate::state::CheckpointStore;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Window sequence and checkpoint guard for one stream
#[derive(Debug, Clone)]
pub struct CursorManager {
    stream: String,
    config: WindowConfig,
    store: Arc<dyn CheckpointStore>,
}

impl CursorManager {
    /// Create a cursor manager for a stream
    pub fn new(
        stream: impl Into<String>,
        config: WindowConfig,
        store: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            stream: stream.into(),
            config,
            store,
        }
    }

    /// Stream name
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Window configuration
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// The persisted checkpoint as an instant, if any
    pub async fn checkpoint(&self) -> Result<Option<DateTime<Utc>>> {
        match self.store.load(&self.stream).await? {
            Some(value) => Ok(Some(self.config.cursor_format.parse_value(&value)?)),
            None => Ok(None),
        }
    }

    /// Windows still to read as of `now`
    ///
    /// A fresh call re-derives the sequence from the current checkpoint.
    pub async fn windows(&self, now: DateTime<Utc>) -> Result<Windows> {
        let checkpoint = self.checkpoint().await?;
        debug!(
            stream = %self.stream,
            checkpoint = ?checkpoint,
            now = %now,
            "Computing windows"
        );
        Ok(windows(&self.config, checkpoint, now))
    }

    /// Persist `end` as the new checkpoint
    ///
    /// Fails without touching the store if `end` is earlier than the
    /// persisted value. Returns the committed value in native format.
    pub async fn advance(&self, end: DateTime<Utc>) -> Result<Value> {
        let format = self.config.cursor_format;

        if let Some(current) = self.checkpoint().await? {
            if end < current {
                return Err(Error::Checkpoint {
                    stream: self.stream.clone(),
                    current: format.format(current),
                    candidate: format.format(end),
                });
            }
        }

        let value = format.to_value(end);
        self.store.commit(&self.stream, value.clone()).await?;
        debug!(stream = %self.stream, cursor = %value, "Checkpoint advanced");
        Ok(value)
    }
}

//! State types for tracking export progress
//!
//! These types are serialized to JSON and persisted between runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Complete state for a connector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: BTreeMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Get cursor for a stream
    pub fn get_cursor(&self, stream: &str) -> Option<&Value> {
        self.streams.get(stream)?.cursor.as_ref()
    }

    /// Set cursor for a stream
    pub fn set_cursor(&mut self, stream: &str, cursor: Value) {
        self.get_stream_mut(stream).cursor = Some(cursor);
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    /// End of the last fully drained window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Value>,
}

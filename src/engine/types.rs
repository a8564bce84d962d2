//! Engine types
//!
//! Messages, sinks, reader phases and run summaries.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

/// A message emitted during a read
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message {
    /// One extracted record
    Record {
        /// Stream name
        stream: String,
        /// The record payload
        data: Value,
    },
    /// Checkpoint advanced after a fully drained window
    State {
        /// Stream name
        stream: String,
        /// New cursor, in the stream's native representation
        cursor: Value,
    },
    /// Log message
    Log {
        /// Log level
        level: LogLevel,
        /// Log message
        message: String,
    },
}

/// Log level for engine messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// General information
    Info,
    /// Warning
    Warn,
    /// Error (non-fatal)
    Error,
}

impl Message {
    /// Create a record message
    pub fn record(stream: impl Into<String>, data: Value) -> Self {
        Self::Record {
            stream: stream.into(),
            data,
        }
    }

    /// Create a state message
    pub fn state(stream: impl Into<String>, cursor: Value) -> Self {
        Self::State {
            stream: stream.into(),
            cursor,
        }
    }

    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Create an info log
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    /// Create an error log
    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    /// Check if this is a log message
    pub fn is_log(&self) -> bool {
        matches!(self, Self::Log { .. })
    }

    /// Serialize as one JSON line
    pub fn to_json_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::output(format!("{e}")))
    }
}

/// Destination for emitted messages
#[async_trait]
pub trait MessageSink: Send {
    /// Deliver one message
    async fn emit(&mut self, message: Message) -> Result<()>;
}

#[async_trait]
impl MessageSink for Vec<Message> {
    async fn emit(&mut self, message: Message) -> Result<()> {
        self.push(message);
        Ok(())
    }
}

#[async_trait]
impl MessageSink for mpsc::Sender<Message> {
    async fn emit(&mut self, message: Message) -> Result<()> {
        self.send(message)
            .await
            .map_err(|_| Error::output("message receiver closed"))
    }
}

/// Where a stream reader is in its read loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderPhase {
    /// No window requested yet
    Idle,
    /// Choosing the next window
    WindowLoop,
    /// Requesting and draining pages
    PageLoop,
    /// Waiting before a retry
    Backoff,
    /// Window drained, checkpoint being advanced
    WindowDone,
    /// Window sequence exhausted
    Finished,
    /// Aborted by an error or cancellation
    Failed,
}

impl ReaderPhase {
    /// Whether the reader has stopped
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

/// Statistics from one stream read
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReadSummary {
    /// Stream name
    pub stream: String,
    /// Windows fully drained and checkpointed
    pub windows_completed: usize,
    /// Pages received
    pub pages: usize,
    /// Records emitted
    pub records: usize,
    /// Retries performed
    pub retries: usize,
    /// Checkpoint after the read
    pub final_checkpoint: Option<Value>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ReadSummary {
    /// Create an empty summary for a stream
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            ..Default::default()
        }
    }
}

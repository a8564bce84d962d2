//! Multi-stream runner
//!
//! Streams are independent: they share an HTTP client, a checkpoint store
//! and a cancellation token, but one stream failing never stops another.

use super::reader::StreamReader;
use super::types::{Message, ReadSummary};
use crate::clock::{system_clock, SharedClock};
use crate::error::Result;
use crate::http::HttpClient;
use crate::state::CheckpointStore;
use crate::stream::StreamDefinition;
use crate::template::TemplateContext;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Result of reading one stream
#[derive(Debug)]
pub struct StreamOutcome {
    /// Stream name
    pub stream: String,
    /// Summary on success, the stream's failure otherwise
    pub result: Result<ReadSummary>,
}

impl StreamOutcome {
    /// Whether the stream finished all its windows
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// A stream's outcome together with everything it emitted
#[derive(Debug)]
pub struct CollectedRun {
    /// How the stream ended
    pub outcome: StreamOutcome,
    /// Emitted messages, in order
    pub messages: Vec<Message>,
}

/// Runs a set of streams concurrently
#[derive(Debug)]
pub struct SourceRunner {
    streams: Vec<Arc<StreamDefinition>>,
    client: HttpClient,
    store: Arc<dyn CheckpointStore>,
    context: TemplateContext,
    clock: SharedClock,
    cancel: CancellationToken,
}

impl SourceRunner {
    /// Create a runner over compiled streams
    pub fn new(
        streams: Vec<StreamDefinition>,
        client: HttpClient,
        store: Arc<dyn CheckpointStore>,
        context: TemplateContext,
    ) -> Self {
        Self {
            streams: streams.into_iter().map(Arc::new).collect(),
            client,
            store,
            context,
            clock: system_clock(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use a different clock
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Use an externally owned cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels every stream of this runner
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Names of the streams this runner reads
    pub fn stream_names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name.as_str()).collect()
    }

    fn reader(&self, stream: &Arc<StreamDefinition>) -> StreamReader {
        StreamReader::new(
            Arc::clone(stream),
            self.client.clone(),
            Arc::clone(&self.store),
            self.context.clone(),
        )
        .with_clock(Arc::clone(&self.clock))
        .with_cancellation(self.cancel.child_token())
    }

    /// Read all streams, sending messages to `sink` as they are produced
    ///
    /// Messages of different streams interleave; within one stream they
    /// keep their order.
    pub async fn run(&self, sink: mpsc::Sender<Message>) -> Vec<StreamOutcome> {
        info!(streams = self.streams.len(), "Starting run");

        let reads = self.streams.iter().map(|stream| {
            let mut reader = self.reader(stream);
            let mut sink = sink.clone();
            async move {
                let result = reader.read(&mut sink).await;
                StreamOutcome {
                    stream: stream.name.clone(),
                    result,
                }
            }
        });

        let outcomes = join_all(reads).await;
        log_outcomes(&outcomes);
        outcomes
    }

    /// Read all streams, collecting each stream's messages separately
    pub async fn run_collect(&self) -> Vec<CollectedRun> {
        let reads = self.streams.iter().map(|stream| {
            let mut reader = self.reader(stream);
            async move {
                let mut messages = Vec::new();
                let result = reader.read(&mut messages).await;
                CollectedRun {
                    outcome: StreamOutcome {
                        stream: stream.name.clone(),
                        result,
                    },
                    messages,
                }
            }
        });

        let runs = join_all(reads).await;
        let outcomes: Vec<&StreamOutcome> = runs.iter().map(|run| &run.outcome).collect();
        log_outcomes(outcomes);
        runs
    }
}

fn log_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a StreamOutcome>) {
    let (mut succeeded, mut failed) = (0usize, 0usize);
    for outcome in outcomes {
        if outcome.is_success() {
            succeeded += 1;
        } else {
            failed += 1;
        }
    }
    info!(succeeded, failed, "Run finished");
}

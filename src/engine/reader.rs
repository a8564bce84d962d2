//! Per-stream read loop
//!
//! A [`StreamReader`] walks one stream's windows in order. Each window is
//! drained page by page; transient failures are retried in place; the
//! checkpoint advances only after a window's last page is emitted.

use super::types::{Message, MessageSink, ReadSummary, ReaderPhase};
use crate::backoff::{BackoffDecision, RetryState};
use crate::clock::{system_clock, SharedClock};
use crate::cursor::{CursorManager, TimeWindow};
use crate::error::{Error, Result};
use crate::http::{HttpClient, ResponsePage};
use crate::pagination::{NextPage, PaginationState};
use crate::request::{build_request, RequestSpec};
use crate::state::CheckpointStore;
use crate::stream::StreamDefinition;
use crate::template::TemplateContext;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Reads one stream from its checkpoint up to "now"
#[derive(Debug)]
pub struct StreamReader {
    stream: Arc<StreamDefinition>,
    client: HttpClient,
    cursor: CursorManager,
    context: TemplateContext,
    clock: SharedClock,
    cancel: CancellationToken,
    phase: ReaderPhase,
}

impl StreamReader {
    /// Create a reader using the system clock and a fresh cancellation token
    pub fn new(
        stream: Arc<StreamDefinition>,
        client: HttpClient,
        store: Arc<dyn CheckpointStore>,
        context: TemplateContext,
    ) -> Self {
        let cursor = CursorManager::new(stream.name.clone(), stream.window.clone(), store);
        Self {
            stream,
            client,
            cursor,
            context,
            clock: system_clock(),
            cancel: CancellationToken::new(),
            phase: ReaderPhase::Idle,
        }
    }

    /// Use a different clock
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Stop when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.stream.name
    }

    /// Current phase
    pub fn phase(&self) -> ReaderPhase {
        self.phase
    }

    /// Read every remaining window, emitting records and checkpoints to `sink`
    ///
    /// On failure the checkpoint stays at the end of the last completed
    /// window, so a rerun resumes from there.
    pub async fn read<S>(&mut self, sink: &mut S) -> Result<ReadSummary>
    where
        S: MessageSink + ?Sized,
    {
        let started = Instant::now();
        let name = self.stream.name.clone();
        let mut summary = ReadSummary::new(&name);

        let now = self.clock.now();
        let ctx = self.context.clone().at(now);

        self.phase = ReaderPhase::WindowLoop;
        let windows = match self.cursor.windows(now).await {
            Ok(windows) => windows,
            Err(err) => return Err(self.fail(err, None)),
        };
        let format = self.stream.window.cursor_format;
        summary.final_checkpoint = self
            .cursor
            .checkpoint()
            .await
            .ok()
            .flatten()
            .map(|at| format.to_value(at));

        info!(stream = %name, range_end = %windows.range_end(), "Starting stream read");

        for window in windows {
            if self.cancel.is_cancelled() {
                return Err(self.fail(Error::Cancelled, Some(&window)));
            }

            debug!(
                stream = %name,
                window_start = %window.start,
                window_end = %window.end,
                "Reading window"
            );

            self.phase = ReaderPhase::PageLoop;
            if let Err(err) = self.read_window(&window, &ctx, sink, &mut summary).await {
                return Err(self.fail(err, Some(&window)));
            }

            self.phase = ReaderPhase::WindowDone;
            let cursor = match self.cursor.advance(window.end).await {
                Ok(cursor) => cursor,
                Err(err) => return Err(self.fail(err, Some(&window))),
            };
            if let Err(err) = sink.emit(Message::state(&name, cursor.clone())).await {
                return Err(self.fail(err, Some(&window)));
            }

            info!(
                stream = %name,
                window_start = %window.start,
                window_end = %window.end,
                cursor = %cursor,
                "Window complete"
            );
            summary.windows_completed += 1;
            summary.final_checkpoint = Some(cursor);
            self.phase = ReaderPhase::WindowLoop;
        }

        self.phase = ReaderPhase::Finished;
        #[allow(clippy::cast_possible_truncation)]
        {
            summary.duration_ms = started.elapsed().as_millis() as u64;
        }

        info!(
            stream = %name,
            windows = summary.windows_completed,
            pages = summary.pages,
            records = summary.records,
            retries = summary.retries,
            duration_ms = summary.duration_ms,
            "Completed stream read"
        );

        Ok(summary)
    }

    /// Drain every page of one window
    async fn read_window<S>(
        &mut self,
        window: &TimeWindow,
        ctx: &TemplateContext,
        sink: &mut S,
        summary: &mut ReadSummary,
    ) -> Result<()>
    where
        S: MessageSink + ?Sized,
    {
        let stream = Arc::clone(&self.stream);
        let mut pagination = PaginationState::new();
        let mut token = stream.paginator.initial_token();

        loop {
            let request = build_request(&stream, window, token.as_ref(), ctx)?;
            let response = self.send_with_retries(&request, summary).await?;

            let body = response.json()?;
            let records = stream.extractor.extract(&body)?;
            let count = records.len();
            summary.pages += 1;

            debug!(
                stream = %stream.name,
                window_start = %window.start,
                page = summary.pages,
                records = count,
                "Page received"
            );

            for record in records {
                sink.emit(Message::record(&stream.name, record.data)).await?;
            }
            summary.records += count;

            match stream
                .paginator
                .next_page(&body, &response.headers, count, &mut pagination)
            {
                NextPage::Next(next) => token = Some(next),
                NextPage::Done => return Ok(()),
            }
        }
    }

    /// Send one request, waiting and resending on transient failures
    async fn send_with_retries(
        &mut self,
        request: &RequestSpec,
        summary: &mut ReadSummary,
    ) -> Result<ResponsePage> {
        let mut retry = RetryState::new();
        let secrets = self.stream.auth.secret_query_params();

        loop {
            self.phase = ReaderPhase::PageLoop;
            debug!(
                stream = %self.stream.name,
                url = %request.display_url(&secrets),
                attempt = retry.attempts(),
                "Sending request"
            );

            let outcome = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(Error::Cancelled),
                outcome = self.client.send(request) => outcome,
            };
            let status = outcome.as_ref().ok().map(|page| page.status);

            match self.stream.error_handler.decide(outcome, &mut retry) {
                BackoffDecision::Continue(page) => return Ok(page),
                BackoffDecision::Abort(err) => return Err(err),
                BackoffDecision::Retry(wait) => {
                    self.phase = ReaderPhase::Backoff;
                    summary.retries += 1;
                    warn!(
                        stream = %self.stream.name,
                        status = ?status,
                        attempt = retry.attempts(),
                        wait_ms = duration_millis(wait),
                        "Transient failure, backing off"
                    );

                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => return Err(Error::Cancelled),
                        () = tokio::time::sleep(wait) => {}
                    }
                }
            }
        }
    }

    /// Move to `Failed` and attach stream context to a failure
    fn fail(&mut self, err: Error, window: Option<&TimeWindow>) -> Error {
        self.phase = ReaderPhase::Failed;
        if err.is_cancelled() {
            info!(stream = %self.stream.name, "Stream read cancelled");
            return err;
        }

        let window = window.map_or_else(|| "-".to_string(), ToString::to_string);
        error!(stream = %self.stream.name, window = %window, error = %err, "Stream read failed");
        err.in_stream(self.stream.name.clone(), window)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn duration_millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

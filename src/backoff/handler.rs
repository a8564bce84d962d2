//! Error handler: classification, waits and the retry bound

use super::strategies::{BackoffStrategy, ConstantBackoff};
use crate::error::{Error, Result};
use crate::http::ResponsePage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default number of retries per request
pub const DEFAULT_MAX_RETRIES: u32 = 5;

// ============================================================================
// Classification
// ============================================================================

/// Outcome of one send, before any wait is computed
#[derive(Debug)]
pub enum Classification {
    /// A response to hand to extraction and pagination
    Success(ResponsePage),
    /// A transient failure; the response is kept for header-driven waits
    Retryable {
        /// Why the attempt failed
        error: Error,
        /// The response, when one was received
        response: Option<ResponsePage>,
    },
    /// A failure retrying will not fix
    Fatal(Error),
}

/// What the reader should do next
#[derive(Debug)]
pub enum BackoffDecision {
    /// Proceed with this response
    Continue(ResponsePage),
    /// Wait, then resend the same request
    Retry(Duration),
    /// Abort the stream
    Abort(Error),
}

// ============================================================================
// Response Filters
// ============================================================================

/// Action a filter forces for matching responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAction {
    /// Treat as retryable
    Retry,
    /// Treat as fatal
    Fail,
}

/// Overrides the default classification for listed status codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFilter {
    /// Forced action
    pub action: FilterAction,
    /// Status codes the filter applies to
    pub http_codes: Vec<u16>,
}

impl ResponseFilter {
    /// Create a filter
    pub fn new(action: FilterAction, http_codes: impl Into<Vec<u16>>) -> Self {
        Self {
            action,
            http_codes: http_codes.into(),
        }
    }

    fn matches(&self, status: u16) -> bool {
        self.http_codes.contains(&status)
    }
}

// ============================================================================
// Retry Bound
// ============================================================================

/// Limits on retrying a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBound {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Total wait allowed across those retries
    pub max_wait: Option<Duration>,
}

impl Default for RetryBound {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_wait: None,
        }
    }
}

/// Retry bookkeeping for the request currently in flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Retries performed so far
    pub retries: u32,
    /// Time waited so far
    pub waited: Duration,
}

impl RetryState {
    /// Create a fresh retry state
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts made so far, including the first
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }
}

// ============================================================================
// Error Handler
// ============================================================================

/// Classifies outcomes and computes waits for one stream
#[derive(Debug, Clone)]
pub struct ErrorHandler {
    strategy: Arc<dyn BackoffStrategy>,
    filters: Vec<ResponseFilter>,
    bound: RetryBound,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(Arc::new(ConstantBackoff::default()))
    }
}

impl ErrorHandler {
    /// Create a handler with default classification and bound
    pub fn new(strategy: Arc<dyn BackoffStrategy>) -> Self {
        Self {
            strategy,
            filters: Vec::new(),
            bound: RetryBound::default(),
        }
    }

    /// Set the retry bound
    #[must_use]
    pub fn with_bound(mut self, bound: RetryBound) -> Self {
        self.bound = bound;
        self
    }

    /// Add a response filter; earlier filters win
    #[must_use]
    pub fn with_filter(mut self, filter: ResponseFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// The retry bound
    pub fn bound(&self) -> RetryBound {
        self.bound
    }

    /// The backoff strategy
    pub fn strategy(&self) -> &dyn BackoffStrategy {
        self.strategy.as_ref()
    }

    /// Classify the outcome of one send
    ///
    /// - 2xx: success
    /// - 401/403: fatal authentication error
    /// - 429 and 5xx: retryable
    /// - any other status: fatal client error
    /// - network failures and timeouts: retryable
    ///
    /// Response filters take precedence over the status rules.
    pub fn classify(&self, outcome: Result<ResponsePage>) -> Classification {
        let response = match outcome {
            Ok(response) => response,
            Err(error) if error.is_retryable() => {
                return Classification::Retryable {
                    error,
                    response: None,
                }
            }
            Err(error) => return Classification::Fatal(error),
        };

        let status = response.status;
        let forced = self
            .filters
            .iter()
            .find(|f| f.matches(status))
            .map(|f| f.action);

        if forced.is_none() && response.is_success() {
            return Classification::Success(response);
        }

        let error = status_error(&response);
        let retry = match forced {
            Some(FilterAction::Retry) => true,
            Some(FilterAction::Fail) => false,
            None => error.is_retryable(),
        };

        if retry {
            Classification::Retryable {
                error,
                response: Some(response),
            }
        } else {
            Classification::Fatal(error)
        }
    }

    /// Classify an outcome and apply the backoff policy
    ///
    /// On `Retry`, `state` already accounts for the returned wait.
    pub fn decide(&self, outcome: Result<ResponsePage>, state: &mut RetryState) -> BackoffDecision {
        match self.classify(outcome) {
            Classification::Success(response) => BackoffDecision::Continue(response),
            Classification::Fatal(error) => BackoffDecision::Abort(error),
            Classification::Retryable { error, response } => {
                if state.retries >= self.bound.max_retries {
                    return BackoffDecision::Abort(exhausted(state, &error));
                }

                let wait = self.strategy.wait(state.retries + 1, response.as_ref());
                if let Some(max_wait) = self.bound.max_wait {
                    if state.waited + wait > max_wait {
                        return BackoffDecision::Abort(exhausted(state, &error));
                    }
                }

                state.retries += 1;
                state.waited += wait;
                BackoffDecision::Retry(wait)
            }
        }
    }
}

/// Error for a non-success status
fn status_error(response: &ResponsePage) -> Error {
    let status = response.status;
    let body = response.body_excerpt();
    match status {
        401 | 403 => Error::Authentication { status, body },
        429 | 500..=599 => Error::RateLimitOrServer { status, body },
        _ => Error::Client { status, body },
    }
}

fn exhausted(state: &RetryState, last_error: &Error) -> Error {
    Error::RetryExhausted {
        attempts: state.attempts(),
        last_error: last_error.to_string(),
    }
}

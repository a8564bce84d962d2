//! Backoff strategy implementations

use crate::http::ResponsePage;
use std::fmt::Debug;
use std::time::Duration;

/// Computes how long to wait before retry number `attempt` (1-based)
pub trait BackoffStrategy: Send + Sync + Debug {
    /// Wait before the given retry
    fn wait(&self, attempt: u32, response: Option<&ResponsePage>) -> Duration;
}

// ============================================================================
// Constant Backoff
// ============================================================================

/// Fixed wait, independent of the attempt count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantBackoff {
    /// Wait between attempts
    pub backoff: Duration,
}

impl ConstantBackoff {
    /// Create a constant backoff
    pub fn new(backoff: Duration) -> Self {
        Self { backoff }
    }

    /// Constant backoff in whole seconds
    pub fn secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl Default for ConstantBackoff {
    fn default() -> Self {
        Self::secs(60)
    }
}

impl BackoffStrategy for ConstantBackoff {
    fn wait(&self, _attempt: u32, _response: Option<&ResponsePage>) -> Duration {
        self.backoff
    }
}

// ============================================================================
// Exponential Backoff
// ============================================================================

/// `initial * factor^(attempt - 1)`, capped at `max`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    /// Wait before the first retry
    pub initial: Duration,
    /// Growth factor per attempt
    pub factor: f64,
    /// Upper bound for a single wait
    pub max: Duration,
}

impl ExponentialBackoff {
    /// Create an exponential backoff
    pub fn new(initial: Duration, factor: f64, max: Duration) -> Self {
        Self {
            initial,
            factor,
            max,
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 2.0, Duration::from_secs(300))
    }
}

impl BackoffStrategy for ExponentialBackoff {
    #[allow(clippy::cast_possible_wrap)]
    fn wait(&self, attempt: u32, _response: Option<&ResponsePage>) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let secs = self.initial.as_secs_f64() * self.factor.max(1.0).powi(exponent);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            return self.max;
        }
        Duration::from_secs_f64(secs)
    }
}

// ============================================================================
// Retry-After Header Backoff
// ============================================================================

/// Wait taken from a response header, in seconds
///
/// Falls back to a fixed wait when the header is absent or not numeric,
/// and for transport failures that carry no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAfterBackoff {
    /// Header carrying the wait
    pub header: String,
    /// Wait used when the header is unusable
    pub fallback: Duration,
    /// Upper bound for a header-supplied wait
    pub max: Option<Duration>,
}

impl RetryAfterBackoff {
    /// Create a header backoff
    pub fn new(header: impl Into<String>, fallback: Duration) -> Self {
        Self {
            header: header.into(),
            fallback,
            max: None,
        }
    }

    /// Cap header-supplied waits
    #[must_use]
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = Some(max);
        self
    }
}

impl Default for RetryAfterBackoff {
    fn default() -> Self {
        Self::new("Retry-After", Duration::from_secs(60))
    }
}

impl BackoffStrategy for RetryAfterBackoff {
    fn wait(&self, _attempt: u32, response: Option<&ResponsePage>) -> Duration {
        let from_header = response
            .and_then(|r| r.header(&self.header))
            .and_then(|v| v.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

        match (from_header, self.max) {
            (Some(wait), Some(max)) => wait.min(max),
            (Some(wait), None) => wait,
            (None, _) => self.fallback,
        }
    }
}

//! Backoff and error classification module
//!
//! Supports: Constant, Exponential, Retry-After header
//!
//! # Overview
//!
//! [`ErrorHandler::classify`] maps the outcome of one send onto
//! success, retryable or fatal. [`ErrorHandler::decide`] adds the wait
//! computed by the configured [`BackoffStrategy`] and enforces the
//! [`RetryBound`], turning an over-budget retry into `RetryExhausted`.
//!
//! Nothing here sleeps or resends: the stream reader owns both.

mod handler;
mod strategies;

pub use handler::{
    BackoffDecision, Classification, ErrorHandler, FilterAction, ResponseFilter, RetryBound,
    RetryState, DEFAULT_MAX_RETRIES,
};
pub use strategies::{
    BackoffStrategy, ConstantBackoff, ExponentialBackoff, RetryAfterBackoff,
};

#[cfg(test)]
mod tests;

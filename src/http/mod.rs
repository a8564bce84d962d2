//! HTTP client module
//!
//! Transport only: one send per call, no status interpretation.
//!
//! # Features
//!
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Timeouts**: Per-client request timeout, reported as a network error
//! - **Responses**: [`ResponsePage`] keeps status, headers and body for
//!   classification by the error handler

mod client;
mod rate_limit;
mod response;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use response::ResponsePage;

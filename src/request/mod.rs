//! Request building module
//!
//! [`build_request`] is a pure function from a stream definition, a window
//! and an optional page token to a concrete [`RequestSpec`]. It performs no
//! I/O and never retries; every failure it reports is a configuration error
//! raised before anything is sent.

mod builder;
mod types;

pub use builder::build_request;
pub use types::{RequestSpec, RequestTemplate};

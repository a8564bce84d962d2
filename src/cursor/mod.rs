//! Incremental cursor module
//!
//! Splits a configured time range into an ordered, lazy sequence of
//! half-open windows and guards the per-stream checkpoint.
//!
//! # Overview
//!
//! - [`windows`] derives the window sequence from a [`WindowConfig`], the
//!   persisted checkpoint and an explicit `now`
//! - [`CursorManager`] binds that computation to a stream and a
//!   [`CheckpointStore`](crate::state::CheckpointStore), refusing any
//!   checkpoint that would move backward
//! - [`CursorFormat`](crate::types::CursorFormat) converts instants to and
//!   from the stream's native cursor representation

mod format;
mod manager;
mod window;

pub use manager::CursorManager;
pub use window::{parse_duration, windows, Granularity, TimeWindow, WindowConfig, Windows};

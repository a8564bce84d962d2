//! State management module
//!
//! Defines the persisted checkpoint shape and where it is stored.
//! State is read at run start and written after every completed window.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - stream name → last advanced cursor value, in the stream's
//!   native representation (epoch milliseconds or a date string)
//! - `CheckpointStore` - the storage seam the cursor manager writes through
//! - `StateManager` - in-memory or file-based store with atomic writes

mod manager;
mod types;

pub use manager::{CheckpointStore, StateManager};
pub use types::{State, StreamState};

#[cfg(test)]
mod tests;

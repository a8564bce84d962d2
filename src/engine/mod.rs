//! Execution engine module
//!
//! Read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `StreamReader` - Reads one stream window by window, advancing its checkpoint
//! - `SourceRunner` - Runs several streams concurrently and independently
//! - Message types for output (Record, State, Log) and the sinks that receive them

mod reader;
mod runner;
mod types;

pub use reader::StreamReader;
pub use runner::{CollectedRun, SourceRunner, StreamOutcome};
pub use types::{LogLevel, Message, MessageSink, ReadSummary, ReaderPhase};

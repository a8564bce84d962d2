// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unused_async)]

//! # Export Connector Development Kit
//!
//! A small engine for incremental, time-windowed exports from HTTP APIs.
//!
//! ## Features
//!
//! - **Declarative connectors**: streams described in YAML, compiled against a config
//! - **Time windows**: half-open `[start, end)` windows from a checkpoint up to now
//! - **Checkpointing**: monotonic per-stream cursors, persisted after every window
//! - **Retry and backoff**: status classification with bounded retries
//! - **Pagination**: offset, cursor and link header strategies
//! - **Cancellation**: every stream stops promptly on a shared token
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use export_cdk::config::SourceConfig;
//! use export_cdk::engine::SourceRunner;
//! use export_cdk::http::HttpClient;
//! use export_cdk::loader::{compile, load_connector};
//! use export_cdk::state::StateManager;
//! use export_cdk::template::TemplateContext;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> export_cdk::Result<()> {
//!     let manifest = load_connector("dixa")?;
//!     let config = SourceConfig::from_json(r#"{"api_token":"...","start_date":"2023-01-01"}"#)?;
//!     let streams = compile(&manifest, &config)?;
//!
//!     let runner = SourceRunner::new(
//!         streams,
//!         HttpClient::new()?,
//!         Arc::new(StateManager::from_file("state.json")?),
//!         TemplateContext::with_config(config.to_template_value()),
//!     );
//!
//!     for run in runner.run_collect().await {
//!         println!("{}: {} messages", run.outcome.stream, run.messages.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   loader: YAML manifest + SourceConfig → StreamDefinition    │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────────────────────────────────────────────────────┐
//! │   engine: SourceRunner → StreamReader per stream             │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────┬──────────┬───────┴──────┬────────────┬────────────┐
//! │  cursor  │ request  │    http      │  backoff   │  extract   │
//! ├──────────┼──────────┼──────────────┼────────────┼────────────┤
//! │ Windows  │ Template │ Rate limit   │ Classify   │ Path       │
//! │ Format   │ Auth     │ Timeout      │ Constant   │ Primary    │
//! │ Advance  │ Params   │ Send         │ Header     │ key check  │
//! └──────────┴──────────┴──────────────┴────────────┴────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Time source abstraction
pub mod clock;

/// Template interpolation
pub mod template;

/// Source configuration
pub mod config;

/// Authentication
pub mod auth;

/// HTTP client with rate limiting and timeouts
pub mod http;

/// Response classification and backoff
pub mod backoff;

/// Time windows and checkpoint cursors
pub mod cursor;

/// Record extraction
pub mod extract;

/// Pagination strategies
pub mod pagination;

/// Request construction
pub mod request;

/// Checkpoint persistence
pub mod state;

/// Compiled stream definitions
pub mod stream;

/// Stream readers and the concurrent runner
pub mod engine;

/// YAML loader for connector manifests
pub mod loader;

/// Built-in connector manifests
pub mod connectors;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::SourceConfig;
pub use engine::{Message, SourceRunner, StreamReader};
pub use loader::{compile, load_connector, load_connector_from_str, ConnectorManifest};
pub use stream::StreamDefinition;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! YAML Loader module
//!
//! Parse connector manifests from YAML and compile them into streams.
//!
//! # Overview
//!
//! The loader module provides:
//! - `ConnectorManifest` - Declarative connector description
//! - `StreamManifest` - Per-stream request, window and strategy settings
//! - YAML parsing with validation
//! - `compile` - Resolves templates and selects strategy implementations

mod compile;
mod parser;
mod types;

pub use compile::{
    compile, http_client_config, select_streams, DEFAULT_GRANULARITY, DEFAULT_START_DATE,
    DEFAULT_STEP,
};
pub use parser::{load_connector, load_connector_from_str};
pub use types::{
    AuthManifest, BackoffManifest, ConnectorManifest, ErrorHandlerManifest, FilterManifest,
    HttpManifest, IncrementalManifest, PaginatorManifest, RequestManifest,
    StopConditionManifest, StreamManifest,
};

//! Loader types
//!
//! Declarative connector manifest types for YAML parsing. Every strategy
//! family is a `type`-tagged enum, so the implementation is chosen when the
//! manifest is compiled.

use crate::auth::Location;
use crate::backoff::FilterAction;
use crate::types::{CursorFormat, Method, StringMap};
use serde::{Deserialize, Serialize};

// ============================================================================
// Connector Manifest
// ============================================================================

/// Top-level connector manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectorManifest {
    /// Connector name
    pub name: String,
    /// Connector version
    #[serde(default = "default_version")]
    pub version: String,
    /// Base URL for all requests (can contain templates)
    pub base_url: String,
    /// Default authentication for every stream
    #[serde(default)]
    pub auth: Option<AuthManifest>,
    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpManifest,
    /// Default error handling for every stream
    #[serde(default)]
    pub error_handler: ErrorHandlerManifest,
    /// Default incremental settings for every stream
    #[serde(default)]
    pub incremental: IncrementalManifest,
    /// Headers sent on every request
    #[serde(default)]
    pub headers: StringMap,
    /// Stream manifests
    pub streams: Vec<StreamManifest>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl ConnectorManifest {
    /// Names of all declared streams, in declaration order
    pub fn stream_names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name.as_str()).collect()
    }
}

// ============================================================================
// Auth Manifest
// ============================================================================

/// Authentication manifest; values are usually `{{ config.* }}` templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthManifest {
    /// No authentication
    None,
    /// Bearer token in the Authorization header
    Bearer {
        /// Token value
        token: String,
    },
    /// API key in a header or query parameter
    ApiKey {
        /// Header or query parameter name
        name: String,
        /// Key value
        value: String,
        /// Where the key goes
        #[serde(default)]
        location: Location,
        /// Prefix prepended to the value
        #[serde(default)]
        prefix: Option<String>,
    },
    /// HTTP basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        #[serde(default)]
        password: String,
    },
    /// Fixed set of headers
    CustomHeaders {
        /// Header values
        headers: StringMap,
    },
}

// ============================================================================
// HTTP Manifest
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpManifest {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Rate limit (requests per second)
    #[serde(default)]
    pub rate_limit_rps: Option<u32>,
    /// User agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpManifest {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            rate_limit_rps: None,
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

// ============================================================================
// Error Handler Manifest
// ============================================================================

/// Classification overrides, retry bound and backoff strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorHandlerManifest {
    /// Maximum retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Maximum total wait per request, in seconds
    #[serde(default)]
    pub max_wait_secs: Option<u64>,
    /// Backoff strategy
    #[serde(default)]
    pub backoff: BackoffManifest,
    /// Status code overrides
    #[serde(default)]
    pub filters: Vec<FilterManifest>,
}

impl Default for ErrorHandlerManifest {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            max_wait_secs: None,
            backoff: BackoffManifest::default(),
            filters: Vec::new(),
        }
    }
}

fn default_max_retries() -> u32 {
    crate::backoff::DEFAULT_MAX_RETRIES
}

/// Backoff strategy manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackoffManifest {
    /// Fixed wait
    Constant {
        /// Wait in seconds
        #[serde(default = "default_constant_secs")]
        backoff_secs: f64,
    },
    /// `initial * factor^(attempt - 1)`, capped
    Exponential {
        /// First wait in seconds
        #[serde(default = "default_initial_secs")]
        initial_secs: f64,
        /// Growth factor
        #[serde(default = "default_factor")]
        factor: f64,
        /// Cap in seconds
        #[serde(default = "default_max_secs")]
        max_secs: f64,
    },
    /// Wait given by a response header, usually Retry-After
    WaitTimeFromHeader {
        /// Header name
        #[serde(default = "default_wait_header")]
        header: String,
        /// Wait when the header is absent or unparseable, in seconds
        #[serde(default = "default_constant_secs")]
        fallback_secs: f64,
        /// Cap in seconds
        #[serde(default)]
        max_secs: Option<f64>,
    },
}

impl Default for BackoffManifest {
    fn default() -> Self {
        Self::Constant {
            backoff_secs: default_constant_secs(),
        }
    }
}

fn default_constant_secs() -> f64 {
    60.0
}

fn default_initial_secs() -> f64 {
    5.0
}

fn default_factor() -> f64 {
    2.0
}

fn default_max_secs() -> f64 {
    300.0
}

fn default_wait_header() -> String {
    "Retry-After".to_string()
}

/// Forces retry or failure for the listed status codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterManifest {
    /// What to do on a match
    pub action: FilterAction,
    /// Status codes
    pub http_codes: Vec<u16>,
}

// ============================================================================
// Incremental Manifest
// ============================================================================

/// Window settings; unset fields fall back to the connector level, then
/// to built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IncrementalManifest {
    /// Start of the range, `YYYY-MM-DD` or RFC 3339 after templating
    #[serde(default)]
    pub start_date: Option<String>,
    /// Window step, e.g. `31d` or `{{ config.batch_size }}d`
    #[serde(default)]
    pub step: Option<String>,
    /// Smallest addressable time unit, e.g. `1d` or `1ms`
    #[serde(default)]
    pub granularity: Option<String>,
    /// Representation of window bounds and checkpoints
    #[serde(default)]
    pub cursor_format: Option<CursorFormat>,
}

impl IncrementalManifest {
    /// Fill unset fields from `fallback`
    #[must_use]
    pub fn or(&self, fallback: &IncrementalManifest) -> IncrementalManifest {
        IncrementalManifest {
            start_date: self.start_date.clone().or_else(|| fallback.start_date.clone()),
            step: self.step.clone().or_else(|| fallback.step.clone()),
            granularity: self
                .granularity
                .clone()
                .or_else(|| fallback.granularity.clone()),
            cursor_format: self.cursor_format.or(fallback.cursor_format),
        }
    }
}

// ============================================================================
// Stream Manifest
// ============================================================================

/// Stream manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamManifest {
    /// Stream name
    pub name: String,
    /// Request configuration
    pub request: RequestManifest,
    /// Path to the record collection; empty means the whole body
    #[serde(default)]
    pub records_path: String,
    /// Pagination configuration
    #[serde(default)]
    pub paginator: PaginatorManifest,
    /// Primary key fields
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// Record field measuring progress
    #[serde(default)]
    pub cursor_field: Option<String>,
    /// Window settings for this stream
    #[serde(default)]
    pub incremental: IncrementalManifest,
    /// Authentication override
    #[serde(default)]
    pub auth: Option<AuthManifest>,
    /// Error handling override
    #[serde(default)]
    pub error_handler: Option<ErrorHandlerManifest>,
}

// ============================================================================
// Request Manifest
// ============================================================================

/// Request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestManifest {
    /// HTTP method
    #[serde(default)]
    pub method: Method,
    /// URL path (can contain templates)
    pub path: String,
    /// Query parameters
    #[serde(default)]
    pub params: StringMap,
    /// Stream-specific headers
    #[serde(default)]
    pub headers: StringMap,
    /// JSON body (for POST/PUT)
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    /// Query parameter receiving the window start
    pub start_param: String,
    /// Query parameter receiving the window end
    pub end_param: String,
}

// ============================================================================
// Paginator Manifest
// ============================================================================

/// Pagination configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginatorManifest {
    /// One page per window
    #[default]
    None,
    /// Offset-based pagination
    Offset {
        /// Offset parameter name
        #[serde(default = "default_offset_param")]
        offset_param: String,
        /// Limit parameter name
        #[serde(default = "default_limit_param")]
        limit_param: String,
        /// Page size
        limit: u32,
        /// Stop condition
        #[serde(default)]
        stop: StopConditionManifest,
    },
    /// Cursor token read from the response body
    Cursor {
        /// Cursor parameter name
        cursor_param: String,
        /// Path to next cursor in response
        cursor_path: String,
        /// Stop condition
        #[serde(default)]
        stop: StopConditionManifest,
    },
    /// Link header pagination (RFC 5988)
    LinkHeader {
        /// Relation to follow
        #[serde(default = "default_link_rel")]
        rel: String,
    },
}

fn default_offset_param() -> String {
    "offset".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_link_rel() -> String {
    "next".to_string()
}

/// Stop condition for pagination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopConditionManifest {
    /// Stop when page is empty
    #[default]
    EmptyPage,
    /// Stop when total count is reached
    TotalCount {
        /// Path to total count
        path: String,
    },
    /// Stop when field equals value
    Field {
        /// Path to field
        path: String,
        /// Value to match
        value: serde_json::Value,
    },
}

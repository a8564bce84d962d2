//! Error types for the export engine
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Every variant maps onto one [`ErrorKind`], which is what the read loop
//! uses to decide between retrying and aborting a stream.

use std::fmt;
use thiserror::Error;

/// The main error type for the export engine
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Response Classification Errors
    // ============================================================================
    #[error("Authentication failed (HTTP {status}): {body}")]
    Authentication { status: u16, body: String },

    #[error("Client error (HTTP {status}): {body}")]
    Client { status: u16, body: String },

    #[error("Rate limited or server error (HTTP {status}): {body}")]
    RateLimitOrServer { status: u16, body: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to extract records from path '{path}': {message}")]
    Extraction { path: String, message: String },

    #[error("Record is missing field '{field}'")]
    MissingField { field: String },

    #[error("Invalid JSONPath: {message}")]
    JsonPath { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("Checkpoint for stream '{stream}' cannot move backward from {current} to {candidate}")]
    Checkpoint {
        stream: String,
        current: String,
        candidate: String,
    },

    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // Run Errors
    // ============================================================================
    #[error("Run cancelled")]
    Cancelled,

    #[error("Stream '{stream}' failed in window {window} ({kind}): {source}")]
    Stream {
        stream: String,
        window: String,
        kind: ErrorKind,
        #[source]
        source: Box<Error>,
    },

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Classification of an error, used for retry decisions and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid setting; fatal before any request is issued
    Configuration,
    /// HTTP 401/403
    Authentication,
    /// Any other 4xx
    Client,
    /// HTTP 429 or 5xx
    RateLimitOrServer,
    /// Timeout or connection failure
    Network,
    /// Payload shape mismatch
    Extraction,
    /// Declared primary key absent from a record
    MissingField,
    /// Checkpoint monotonicity violation
    Checkpoint,
    /// Retryable failure that exceeded the retry bound
    RetryExhausted,
    /// Run-level cancellation
    Cancelled,
    /// Persistence, output or other IO failure
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Authentication => "AuthenticationError",
            ErrorKind::Client => "ClientError",
            ErrorKind::RateLimitOrServer => "RateLimitOrServerError",
            ErrorKind::Network => "NetworkError",
            ErrorKind::Extraction => "ExtractionError",
            ErrorKind::MissingField => "MissingFieldError",
            ErrorKind::Checkpoint => "CheckpointError",
            ErrorKind::RetryExhausted => "RetryExhausted",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Io => "IoError",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_config(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a missing record field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Wrap an error with the stream and window it happened in
    pub fn in_stream(self, stream: impl Into<String>, window: impl Into<String>) -> Self {
        let kind = self.kind();
        Self::Stream {
            stream: stream.into(),
            window: window.into(),
            kind,
            source: Box::new(self),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::UndefinedVariable { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_) => ErrorKind::Configuration,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::Client { .. } => ErrorKind::Client,
            Error::RateLimitOrServer { .. } => ErrorKind::RateLimitOrServer,
            Error::Network { .. } | Error::Timeout { .. } => ErrorKind::Network,
            Error::RetryExhausted { .. } => ErrorKind::RetryExhausted,
            Error::Extraction { .. } | Error::JsonPath { .. } | Error::JsonParse(_) => {
                ErrorKind::Extraction
            }
            Error::MissingField { .. } => ErrorKind::MissingField,
            Error::Checkpoint { .. } => ErrorKind::Checkpoint,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Stream { kind, .. } => *kind,
            Error::State { .. }
            | Error::Output { .. }
            | Error::Io(_)
            | Error::Other(_) => ErrorKind::Io,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Network | ErrorKind::RateLimitOrServer
        )
    }

    /// Check if this error is a run-level cancellation
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

/// Result type alias for the export engine
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

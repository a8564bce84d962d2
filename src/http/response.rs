//! Response page

use crate::error::{Error, Result};
use reqwest::header::HeaderMap;
use serde_json::Value;

/// Longest body excerpt kept in error messages
const EXCERPT_CHARS: usize = 512;

/// One HTTP response, consumed immediately by the reader
#[derive(Debug, Clone)]
pub struct ResponsePage {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body text
    pub body: String,
}

impl ResponsePage {
    /// Create a response page
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// A header value as text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decode the body as JSON
    ///
    /// An empty body decodes as an empty array.
    pub fn json(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }
        serde_json::from_str(&self.body)
            .map_err(|e| Error::extraction("", format!("response body is not JSON: {e}")))
    }

    /// Start of the body, for error messages
    pub fn body_excerpt(&self) -> String {
        let mut excerpt: String = self.body.chars().take(EXCERPT_CHARS).collect();
        if self.body.chars().count() > EXCERPT_CHARS {
            excerpt.push_str("...");
        }
        excerpt
    }
}

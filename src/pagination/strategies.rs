//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{NextPage, PageToken, PaginationState, Paginator, StopCondition};
use crate::extract::lookup_scalar;
use crate::types::StringMap;
use reqwest::header::HeaderMap;
use serde_json::Value;

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - one request per window
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn next_page(
        &self,
        _body: &Value,
        _headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.record_page(records_count);
        state.finish()
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// Common patterns:
/// - `?offset=100&limit=50`
/// - `?skip=100&take=50`
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Query parameter name for offset
    pub offset_param: String,
    /// Query parameter name for limit
    pub limit_param: String,
    /// Number of records per page
    pub limit_value: u32,
    /// Stop condition
    pub stop_condition: StopCondition,
}

impl OffsetPaginator {
    /// Create a new offset paginator
    pub fn new(
        offset_param: impl Into<String>,
        limit_param: impl Into<String>,
        limit_value: u32,
        stop_condition: StopCondition,
    ) -> Self {
        Self {
            offset_param: offset_param.into(),
            limit_param: limit_param.into(),
            limit_value,
            stop_condition,
        }
    }

    fn token(&self, offset: u64) -> PageToken {
        let mut params = StringMap::new();
        params.insert(self.offset_param.clone(), offset.to_string());
        params.insert(self.limit_param.clone(), self.limit_value.to_string());
        PageToken::params(params)
    }
}

impl Paginator for OffsetPaginator {
    fn initial_token(&self) -> Option<PageToken> {
        Some(self.token(0))
    }

    fn next_page(
        &self,
        body: &Value,
        _headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.record_page(records_count);

        if self.stop_condition.should_stop(body, records_count, state) {
            return state.finish();
        }

        // A short page is the last one; a zero limit cannot advance
        if self.limit_value == 0 || records_count < self.limit_value as usize {
            return state.finish();
        }

        state.offset += u64::from(self.limit_value);
        NextPage::Next(self.token(state.offset))
    }
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Opaque cursor token read from the response body
///
/// Common patterns:
/// - `?starting_after=obj_123`
/// - `?cursor=abc123`
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Query parameter name for cursor
    pub cursor_param: String,
    /// Path to the next cursor in the response
    pub cursor_path: String,
    /// Stop condition
    pub stop_condition: StopCondition,
}

impl CursorPaginator {
    /// Create a new cursor paginator
    pub fn new(
        cursor_param: impl Into<String>,
        cursor_path: impl Into<String>,
        stop_condition: StopCondition,
    ) -> Self {
        Self {
            cursor_param: cursor_param.into(),
            cursor_path: cursor_path.into(),
            stop_condition,
        }
    }
}

impl Paginator for CursorPaginator {
    fn next_page(
        &self,
        body: &Value,
        _headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.record_page(records_count);

        if self.stop_condition.should_stop(body, records_count, state) {
            return state.finish();
        }

        match lookup_scalar(body, &self.cursor_path) {
            Some(cursor) if !cursor.is_empty() => {
                // A repeated cursor would loop forever
                if state.cursor.as_deref() == Some(cursor.as_str()) {
                    return state.finish();
                }
                state.cursor = Some(cursor.clone());
                NextPage::Next(PageToken::param(&self.cursor_param, cursor))
            }
            _ => state.finish(),
        }
    }
}

// ============================================================================
// Link Header Pagination
// ============================================================================

/// Link header pagination (RFC 5988)
///
/// Format: `Link: <https://api.example.com/...?page=2>; rel="next", ...`
#[derive(Debug, Clone)]
pub struct LinkHeaderPaginator {
    /// Rel value to follow (default: "next")
    pub rel: String,
}

impl Default for LinkHeaderPaginator {
    fn default() -> Self {
        Self {
            rel: "next".to_string(),
        }
    }
}

impl LinkHeaderPaginator {
    /// Create a new link header paginator
    pub fn new(rel: impl Into<String>) -> Self {
        Self { rel: rel.into() }
    }
}

impl Paginator for LinkHeaderPaginator {
    fn next_page(
        &self,
        _body: &Value,
        headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.record_page(records_count);

        let next_url = headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(|link| parse_link_header(link, &self.rel));

        match next_url {
            Some(url) => NextPage::Next(PageToken::url(url)),
            None => state.finish(),
        }
    }
}

/// Parse a Link header and extract the URL for the given rel
pub(crate) fn parse_link_header(header: &str, target_rel: &str) -> Option<String> {
    // Link header format: <url>; rel="next", <url>; rel="prev"
    for part in header.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in part.trim().split(';') {
            let segment = segment.trim();
            if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                url = Some(inner);
            } else if let Some(stripped) = segment.strip_prefix("rel=") {
                rel = Some(stripped.trim_matches('"').trim_matches('\''));
            }
        }

        if let (Some(u), Some(r)) = (url, rel) {
            if r.split_whitespace().any(|r| r == target_rel) {
                return Some(u.to_string());
            }
        }
    }

    None
}

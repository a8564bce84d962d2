//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use crate::extract::{lookup, lookup_scalar};
use crate::types::StringMap;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::fmt::Debug;

/// What to change on the next request of a window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageToken {
    /// Query parameters to add or replace
    pub query: StringMap,
    /// Absolute URL replacing the stream URL (for link header pagination)
    pub url: Option<String>,
}

impl PageToken {
    /// Token carrying a single query parameter
    pub fn param(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut query = StringMap::new();
        query.insert(key.into(), value.into());
        Self { query, url: None }
    }

    /// Token carrying query parameters
    pub fn params(query: StringMap) -> Self {
        Self { query, url: None }
    }

    /// Token carrying a full next-page URL
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            query: StringMap::new(),
            url: Some(url.into()),
        }
    }
}

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available
    Next(PageToken),
    /// No more pages in this window
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The token of a continuation
    pub fn token(&self) -> Option<&PageToken> {
        match self {
            Self::Next(token) => Some(token),
            Self::Done => None,
        }
    }
}

/// Stop conditions for pagination
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StopCondition {
    /// Stop when page is empty (no records)
    #[default]
    EmptyPage,

    /// Stop when a field has a specific value
    Field {
        /// Path to the field
        path: String,
        /// Value that ends pagination
        value: Value,
    },

    /// Stop when the records fetched reach a total count
    TotalCount {
        /// Path to total count field
        path: String,
    },
}

impl StopCondition {
    /// Create a field-based stop condition
    pub fn field(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Field {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create a total count stop condition
    pub fn total_count(path: impl Into<String>) -> Self {
        Self::TotalCount { path: path.into() }
    }

    /// Whether pagination should stop after this response
    pub fn should_stop(&self, body: &Value, records_count: usize, state: &PaginationState) -> bool {
        match self {
            StopCondition::EmptyPage => records_count == 0,
            StopCondition::Field { path, value } => lookup(body, path) == Some(value),
            StopCondition::TotalCount { path } => lookup_scalar(body, path)
                .and_then(|s| s.parse::<u64>().ok())
                .is_some_and(|total| state.total_fetched >= total),
        }
    }
}

/// Tracks pagination state within one window
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages received so far
    pub pages: u32,
    /// Current offset (for offset-based pagination)
    pub offset: u64,
    /// Current cursor value
    pub cursor: Option<String>,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a received page
    pub fn record_page(&mut self, records_count: usize) {
        self.pages += 1;
        self.total_fetched += records_count as u64;
    }

    /// Mark pagination as complete
    pub fn finish(&mut self) -> NextPage {
        self.done = true;
        NextPage::Done
    }
}

/// Core trait for pagination strategies
///
/// The reader only sees tokens, so a new strategy needs no reader changes.
pub trait Paginator: Send + Sync + Debug {
    /// Parameters for the first request of a window
    fn initial_token(&self) -> Option<PageToken> {
        None
    }

    /// Process a response and determine if there's a next page
    fn next_page(
        &self,
        body: &Value,
        headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage;
}

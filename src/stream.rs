//! Compiled stream definitions
//!
//! A [`StreamDefinition`] is everything the reader needs for one stream,
//! with every strategy already selected. It is built once by the loader and
//! never changes during a run.

use crate::auth::Authenticator;
use crate::backoff::ErrorHandler;
use crate::cursor::WindowConfig;
use crate::extract::RecordExtractor;
use crate::pagination::{NoPaginator, Paginator};
use crate::request::RequestTemplate;
use std::sync::Arc;

/// One logical data feed
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    /// Stream name, also the checkpoint key
    pub name: String,
    /// Primary key field(s)
    pub primary_key: Vec<String>,
    /// Record field measuring progress
    pub cursor_field: Option<String>,
    /// Request shape
    pub request: RequestTemplate,
    /// Window step, granularity and cursor format
    pub window: WindowConfig,
    /// Credentials
    pub auth: Authenticator,
    /// Record extraction
    pub extractor: RecordExtractor,
    /// Pagination strategy
    pub paginator: Arc<dyn Paginator>,
    /// Classification and backoff
    pub error_handler: ErrorHandler,
}

impl StreamDefinition {
    /// Create a stream with no auth, no pagination, and the whole body as
    /// its record collection
    pub fn new(name: impl Into<String>, request: RequestTemplate, window: WindowConfig) -> Self {
        Self {
            name: name.into(),
            primary_key: Vec::new(),
            cursor_field: None,
            request,
            window,
            auth: Authenticator::default(),
            extractor: RecordExtractor::default(),
            paginator: Arc::new(NoPaginator),
            error_handler: ErrorHandler::default(),
        }
    }

    /// Set the primary key; the extractor reads it from every record
    #[must_use]
    pub fn with_primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self.extractor = self.extractor.with_primary_key(self.primary_key.clone());
        self
    }

    /// Set the cursor field
    #[must_use]
    pub fn with_cursor_field(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.extractor = self.extractor.with_cursor_field(field.clone());
        self.cursor_field = Some(field);
        self
    }

    /// Set the record path, keeping key and cursor fields
    #[must_use]
    pub fn with_record_path(mut self, path: impl Into<String>) -> Self {
        let mut extractor =
            RecordExtractor::new(path).with_primary_key(self.primary_key.clone());
        if let Some(field) = &self.cursor_field {
            extractor = extractor.with_cursor_field(field.clone());
        }
        self.extractor = extractor;
        self
    }

    /// Set the authenticator
    #[must_use]
    pub fn with_auth(mut self, auth: Authenticator) -> Self {
        self.auth = auth;
        self
    }

    /// Set the paginator
    #[must_use]
    pub fn with_paginator(mut self, paginator: Arc<dyn Paginator>) -> Self {
        self.paginator = paginator;
        self
    }

    /// Set the error handler
    #[must_use]
    pub fn with_error_handler(mut self, error_handler: ErrorHandler) -> Self {
        self.error_handler = error_handler;
        self
    }
}

//! Request types

use crate::pagination::PageToken;
use crate::types::{Method, StringMap};
use serde_json::Value;
use url::Url;

/// Unrendered request shape of a stream
///
/// String values may contain `{{ ... }}` substitutions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestTemplate {
    /// HTTP method
    pub method: Method,
    /// Base URL shared by the connector's streams
    pub base_url: String,
    /// Path appended to the base URL
    pub path: String,
    /// Extra headers
    pub headers: StringMap,
    /// Extra query parameters
    pub query: StringMap,
    /// Optional JSON body
    pub body: Option<Value>,
    /// Query parameter receiving the window start
    pub start_param: String,
    /// Query parameter receiving the window end
    pub end_param: String,
}

/// One concrete outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    /// HTTP method
    pub method: Method,
    /// Target URL, without the query below
    pub url: Url,
    /// Request headers, credentials included
    pub headers: StringMap,
    /// Query parameters
    pub query: StringMap,
    /// JSON body
    pub body: Option<Value>,
    /// Page token this request was built from
    pub page_token: Option<PageToken>,
}

impl RequestSpec {
    /// URL with the query parameters appended
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        url
    }

    /// URL with credential-bearing query parameters masked, for logging
    pub fn display_url(&self, secret_params: &[&str]) -> String {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                if secret_params.contains(&key.as_str()) {
                    pairs.append_pair(key, "***");
                } else {
                    pairs.append_pair(key, value);
                }
            }
        }
        url.to_string()
    }
}

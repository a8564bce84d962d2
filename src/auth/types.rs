//! Auth configuration types
//!
//! These types represent the runtime auth configuration after template
//! interpolation has been applied.

use crate::types::StringMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location for API key placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Place in HTTP header
    #[default]
    Header,
    /// Place in query parameter
    Query,
}

/// Authentication configuration (after template interpolation)
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// Bearer token authentication
    Bearer {
        /// The bearer token
        token: String,
    },

    /// API Key authentication (header or query)
    ApiKey {
        /// Where to place the API key
        location: Location,
        /// Header or query parameter name
        name: String,
        /// Prefix to add before the value (e.g., "Token ")
        prefix: Option<String>,
        /// The API key value
        value: String,
    },

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// Custom headers
    CustomHeaders {
        /// Headers to add to each request
        headers: StringMap,
    },
}

impl AuthConfig {
    /// Short name of the variant, safe to log
    pub fn kind(&self) -> &'static str {
        match self {
            AuthConfig::None => "none",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::ApiKey { .. } => "api_key",
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::CustomHeaders { .. } => "custom_headers",
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::None => f.write_str("None"),
            AuthConfig::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
            AuthConfig::ApiKey {
                location,
                name,
                prefix,
                ..
            } => f
                .debug_struct("ApiKey")
                .field("location", location)
                .field("name", name)
                .field("prefix", prefix)
                .field("value", &"***")
                .finish(),
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            AuthConfig::CustomHeaders { headers } => f
                .debug_struct("CustomHeaders")
                .field("headers", &headers.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

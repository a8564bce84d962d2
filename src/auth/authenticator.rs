//! Authenticator implementation
//!
//! Applies credentials to the header and query maps of a request under
//! construction.

use super::types::{AuthConfig, Location};
use crate::error::{Error, Result};
use crate::types::StringMap;
use base64::Engine;

/// Authenticator handles applying authentication to outgoing requests
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// The auth configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Query parameters that carry a credential
    pub fn secret_query_params(&self) -> Vec<&str> {
        match &self.config {
            AuthConfig::ApiKey {
                location: Location::Query,
                name,
                ..
            } => vec![name.as_str()],
            _ => Vec::new(),
        }
    }

    /// Check that every credential is present
    pub fn validate(&self) -> Result<()> {
        match &self.config {
            AuthConfig::None | AuthConfig::CustomHeaders { .. } => Ok(()),
            AuthConfig::Bearer { token } => require("token", token),
            AuthConfig::ApiKey { name, value, .. } => {
                require("api key name", name)?;
                require("api key", value)
            }
            AuthConfig::Basic { username, .. } => require("username", username),
        }
    }

    /// Insert credentials into the request's headers or query
    pub fn apply(&self, headers: &mut StringMap, query: &mut StringMap) -> Result<()> {
        self.validate()?;

        match &self.config {
            AuthConfig::None => {}

            AuthConfig::Bearer { token } => {
                headers.insert("Authorization".to_string(), format!("Bearer {token}"));
            }

            AuthConfig::ApiKey {
                location,
                name,
                prefix,
                value,
            } => {
                let val = format!("{}{}", prefix.as_deref().unwrap_or(""), value);
                match location {
                    Location::Header => {
                        headers.insert(name.clone(), val);
                    }
                    Location::Query => {
                        query.insert(name.clone(), val);
                    }
                }
            }

            AuthConfig::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                headers.insert("Authorization".to_string(), format!("Basic {encoded}"));
            }

            AuthConfig::CustomHeaders { headers: extra } => {
                for (key, value) in extra {
                    headers.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(())
    }
}

fn require(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::config(format!("Authentication {what} is empty")));
    }
    Ok(())
}

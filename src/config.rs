//! Source configuration
//!
//! The user-supplied configuration every run starts from. It is validated
//! in full before any request is built, so a bad setting surfaces as a
//! configuration error with no network activity.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// Format of `start_date`
pub const START_DATE_FORMAT: &str = "%Y-%m-%d";

/// Smallest accepted `batch_size`
pub const MIN_BATCH_SIZE: u32 = 1;

/// Largest accepted `batch_size`
pub const MAX_BATCH_SIZE: u32 = 31;

/// Default `batch_size`
pub const DEFAULT_BATCH_SIZE: u32 = 31;

/// Validated connector configuration
#[derive(Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// API token, sent as a bearer credential
    pub api_token: String,
    /// Earliest date to export from
    pub start_date: NaiveDate,
    /// Window step in days
    pub batch_size: u32,
}

impl SourceConfig {
    /// Validate a raw JSON configuration
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::config("Configuration must be a JSON object"))?;

        let api_token = match obj.get("api_token") {
            None | Some(Value::Null) => return Err(Error::missing_config("api_token")),
            Some(Value::String(s)) => s
                .clone()
                .none_if_empty()
                .ok_or_else(|| Error::invalid_config("api_token", "must not be empty"))?,
            Some(_) => return Err(Error::invalid_config("api_token", "must be a string")),
        };

        let start_date = match obj.get("start_date") {
            None | Some(Value::Null) => return Err(Error::missing_config("start_date")),
            Some(Value::String(s)) => NaiveDate::parse_from_str(s, START_DATE_FORMAT)
                .map_err(|e| {
                    Error::invalid_config("start_date", format!("'{s}' is not YYYY-MM-DD: {e}"))
                })?,
            Some(_) => return Err(Error::invalid_config("start_date", "must be a string")),
        };

        let batch_size = match obj.get("batch_size") {
            None | Some(Value::Null) => DEFAULT_BATCH_SIZE,
            Some(v) => {
                let n = v
                    .as_u64()
                    .ok_or_else(|| Error::invalid_config("batch_size", "must be an integer"))?;
                if !(u64::from(MIN_BATCH_SIZE)..=u64::from(MAX_BATCH_SIZE)).contains(&n) {
                    return Err(Error::invalid_config(
                        "batch_size",
                        format!("{n} is outside {MIN_BATCH_SIZE}..={MAX_BATCH_SIZE}"),
                    ));
                }
                n as u32
            }
        };

        Ok(Self {
            api_token,
            start_date,
            batch_size,
        })
    }

    /// Parse and validate a JSON configuration string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Failed to parse config JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Values exposed to templates as `config.*`
    pub fn to_template_value(&self) -> Value {
        json!({
            "api_token": self.api_token,
            "start_date": self.start_date.format(START_DATE_FORMAT).to_string(),
            "batch_size": self.batch_size,
        })
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("api_token", &"***")
            .field("start_date", &self.start_date)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

/// One property of the configuration surface
#[derive(Debug, Clone, Serialize)]
pub struct PropertySpec {
    /// Property name
    pub name: &'static str,
    /// JSON type
    #[serde(rename = "type")]
    pub property_type: &'static str,
    /// Whether the property must be present
    pub required: bool,
    /// Whether the value is a secret
    pub secret: bool,
    /// Human-readable description
    pub description: &'static str,
}

/// The configuration surface, as printed by `export-cdk spec`
pub fn config_spec() -> Vec<PropertySpec> {
    vec![
        PropertySpec {
            name: "api_token",
            property_type: "string",
            required: true,
            secret: true,
            description: "API token sent as a bearer credential",
        },
        PropertySpec {
            name: "start_date",
            property_type: "string",
            required: true,
            secret: false,
            description: "Date to start exporting from, YYYY-MM-DD",
        },
        PropertySpec {
            name: "batch_size",
            property_type: "integer",
            required: false,
            secret: false,
            description: "Days per request window, 1 to 31 (default 31)",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use test_case::test_case;

    #[test]
    fn test_valid_config_with_default_batch_size() {
        let config =
            SourceConfig::from_value(&json!({"api_token": "tok", "start_date": "2023-01-01"}))
                .unwrap();
        assert_eq!(config.api_token, "tok");
        assert_eq!(
            config.start_date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
        assert_eq!(config.batch_size, 31);
    }

    #[test]
    fn test_explicit_batch_size() {
        let config = SourceConfig::from_value(
            &json!({"api_token": "tok", "start_date": "2023-01-01", "batch_size": 7}),
        )
        .unwrap();
        assert_eq!(config.batch_size, 7);
    }

    #[test_case(json!({"start_date": "2023-01-01"}), "api_token" ; "missing token")]
    #[test_case(json!({"api_token": "", "start_date": "2023-01-01"}), "api_token" ; "empty token")]
    #[test_case(json!({"api_token": 12, "start_date": "2023-01-01"}), "api_token" ; "numeric token")]
    #[test_case(json!({"api_token": "tok"}), "start_date" ; "missing start date")]
    #[test_case(json!({"api_token": "tok", "start_date": "01/01/2023"}), "start_date" ; "malformed start date")]
    #[test_case(json!({"api_token": "tok", "start_date": "2023-01-01", "batch_size": 0}), "batch_size" ; "batch size too small")]
    #[test_case(json!({"api_token": "tok", "start_date": "2023-01-01", "batch_size": 32}), "batch_size" ; "batch size too large")]
    #[test_case(json!({"api_token": "tok", "start_date": "2023-01-01", "batch_size": "7"}), "batch_size" ; "batch size not integer")]
    fn test_invalid_config(value: Value, field: &str) {
        let err = SourceConfig::from_value(&value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains(field), "{err}");
    }

    #[test]
    fn test_not_an_object() {
        let err = SourceConfig::from_value(&json!(["api_token"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = SourceConfig::from_json(
            r#"{"api_token": "super-secret", "start_date": "2023-01-01"}"#,
        )
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_template_value() {
        let config = SourceConfig::from_json(
            r#"{"api_token": "tok", "start_date": "2023-01-01", "batch_size": 10}"#,
        )
        .unwrap();
        assert_eq!(
            config.to_template_value(),
            json!({"api_token": "tok", "start_date": "2023-01-01", "batch_size": 10})
        );
    }

    #[test]
    fn test_config_spec_lists_required_fields() {
        let spec = config_spec();
        let required: Vec<_> = spec.iter().filter(|p| p.required).map(|p| p.name).collect();
        assert_eq!(required, vec!["api_token", "start_date"]);
    }
}

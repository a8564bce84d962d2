//! Template interpolation for manifest values
//!
//! Handles `{{ name }}` substitution in connector manifests. This is not an
//! expression language: only a fixed set of names resolves.
//!
//! - `{{ config.<field> }}`: a validated configuration value
//! - `{{ window.start }}` / `{{ window.end }}`: the current window bounds,
//!   formatted in the stream's cursor format
//! - `{{ now }}`: the run's current time (RFC 3339), taken from the injected clock

use crate::error::{Error, Result};
use crate::types::StringMap;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}").unwrap()
});

/// Values available for substitution
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Validated connector configuration
    pub config: Value,
    /// Formatted bounds of the current window
    pub window: Option<(String, String)>,
    /// The run's current time
    pub now: Option<DateTime<Utc>>,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context with config values
    pub fn with_config(config: Value) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set the current time
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Set the formatted bounds of the current window
    #[must_use]
    pub fn for_window(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.window = Some((start.into(), end.into()));
        self
    }

    /// Resolve a name (e.g., "config.api_token")
    pub fn get(&self, path: &str) -> Option<String> {
        let parts: Vec<&str> = path.split('.').collect();

        match parts.as_slice() {
            ["now"] => self
                .now
                .map(|now| now.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ["window", "start"] => self.window.as_ref().map(|(start, _)| start.clone()),
            ["window", "end"] => self.window.as_ref().map(|(_, end)| end.clone()),
            ["config", rest @ ..] if !rest.is_empty() => {
                get_nested_value(&self.config, rest).and_then(value_to_string)
            }
            _ => None,
        }
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Convert a JSON scalar to its substitution text
///
/// Null and structured values do not substitute.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut result = template.to_string();
    let mut errors = Vec::new();

    for cap in TEMPLATE_REGEX.captures_iter(template) {
        let (full_match, [var_path]) = cap.extract();

        match ctx.get(var_path) {
            Some(replacement) => {
                result = result.replace(full_match, &replacement);
            }
            None => {
                errors.push(var_path.to_string());
            }
        }
    }

    if errors.is_empty() {
        Ok(result)
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Check if a string contains template variables
pub fn has_templates(s: &str) -> bool {
    TEMPLATE_REGEX.is_match(s)
}

/// Render every value of a string map
pub fn render_map(map: &StringMap, ctx: &TemplateContext) -> Result<StringMap> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), render(value, ctx)?)))
        .collect()
}

/// Render all string values in a JSON value
pub fn render_value(value: &Value, ctx: &TemplateContext) -> Result<Value> {
    match value {
        Value::String(s) if has_templates(s) => Ok(Value::String(render(s, ctx)?)),
        Value::Object(map) => {
            let mut new_map = serde_json::Map::new();
            for (k, v) in map {
                new_map.insert(k.clone(), render_value(v, ctx)?);
            }
            Ok(Value::Object(new_map))
        }
        Value::Array(arr) => {
            let new_arr: Result<Vec<Value>> = arr.iter().map(|v| render_value(v, ctx)).collect();
            Ok(Value::Array(new_arr?))
        }
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_config_substitution() {
        let ctx = TemplateContext::with_config(json!({
            "api_token": "tok_123"
        }));

        let result = render("Bearer {{ config.api_token }}", &ctx).unwrap();
        assert_eq!(result, "Bearer tok_123");
    }

    #[test]
    fn test_number_substitution() {
        let ctx = TemplateContext::with_config(json!({ "batch_size": 31 }));
        assert_eq!(render("{{ config.batch_size }}d", &ctx).unwrap(), "31d");
    }

    #[test]
    fn test_window_and_now() {
        let now = Utc.with_ymd_and_hms(2023, 2, 15, 0, 0, 0).unwrap();
        let ctx = TemplateContext::new()
            .at(now)
            .for_window("2023-01-01", "2023-02-01");

        assert_eq!(
            render("{{ window.start }}..{{ window.end }}", &ctx).unwrap(),
            "2023-01-01..2023-02-01"
        );
        assert_eq!(render("{{ now }}", &ctx).unwrap(), "2023-02-15T00:00:00Z");
    }

    #[test]
    fn test_undefined_variable() {
        let ctx = TemplateContext::new();
        let result = render("{{ config.missing }}", &ctx);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("config.missing"));
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_unknown_root_is_not_resolved() {
        let ctx = TemplateContext::with_config(json!({ "api_token": "x" }));
        assert!(render("{{ api_token }}", &ctx).is_err());
        assert!(render("{{ stream_state.cursor }}", &ctx).is_err());
    }

    #[test]
    fn test_null_does_not_substitute() {
        let ctx = TemplateContext::with_config(json!({ "api_token": null }));
        assert!(render("{{ config.api_token }}", &ctx).is_err());
    }

    #[test]
    fn test_whitespace_in_template() {
        let ctx = TemplateContext::with_config(json!({"key": "value"}));

        assert_eq!(render("{{config.key}}", &ctx).unwrap(), "value");
        assert_eq!(render("{{ config.key }}", &ctx).unwrap(), "value");
        assert_eq!(render("{{  config.key  }}", &ctx).unwrap(), "value");
    }

    #[test]
    fn test_render_map() {
        let ctx = TemplateContext::with_config(json!({"region": "eu"}));
        let mut map = StringMap::new();
        map.insert("region".to_string(), "{{ config.region }}".to_string());
        map.insert("fixed".to_string(), "yes".to_string());

        let rendered = render_map(&map, &ctx).unwrap();
        assert_eq!(rendered["region"], "eu");
        assert_eq!(rendered["fixed"], "yes");
    }

    #[test]
    fn test_render_value_object() {
        let ctx = TemplateContext::new().for_window("1", "2");
        let input = json!({ "range": { "from": "{{ window.start }}", "to": "{{ window.end }}" }, "n": 3 });

        let result = render_value(&input, &ctx).unwrap();
        assert_eq!(result, json!({ "range": { "from": "1", "to": "2" }, "n": 3 }));
    }
}

//! Record extractor implementation

use super::path::{is_jsonpath_expression, lookup, select_jsonpath};
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// One extracted item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// The item as returned by the source
    pub data: Value,
    /// Primary key value; an array when the key is composite
    pub primary_key: Value,
    /// Cursor field value, when the item carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_value: Option<Value>,
}

/// Extracts records from response payloads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordExtractor {
    path: String,
    primary_key: Vec<String>,
    cursor_field: Option<String>,
}

impl RecordExtractor {
    /// Create an extractor for the collection at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the primary key field(s)
    #[must_use]
    pub fn with_primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the cursor field
    #[must_use]
    pub fn with_cursor_field(mut self, field: impl Into<String>) -> Self {
        self.cursor_field = Some(field.into());
        self
    }

    /// Path of the record collection
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Primary key field(s)
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Extract every record from a payload, preserving order
    pub fn extract(&self, body: &Value) -> Result<Vec<Record>> {
        self.items(body)?
            .into_iter()
            .map(|item| self.to_record(item))
            .collect()
    }

    fn items(&self, body: &Value) -> Result<Vec<Value>> {
        let items = if is_jsonpath_expression(&self.path) {
            select_jsonpath(body, &self.path)?
        } else {
            match lookup(body, &self.path) {
                Some(Value::Array(arr)) => arr.clone(),
                Some(other) => {
                    return Err(Error::extraction(
                        &self.path,
                        format!("expected an array, found {}", type_name(other)),
                    ))
                }
                None => return Err(Error::extraction(&self.path, "path not found in response")),
            }
        };

        if let Some(bad) = items.iter().find(|item| !item.is_object()) {
            return Err(Error::extraction(
                &self.path,
                format!("expected objects, found {}", type_name(bad)),
            ));
        }

        Ok(items)
    }

    fn to_record(&self, data: Value) -> Result<Record> {
        let mut keys = Vec::with_capacity(self.primary_key.len());
        for field in &self.primary_key {
            match lookup(&data, field) {
                Some(Value::Null) | None => return Err(Error::missing_field(field)),
                Some(v) => keys.push(v.clone()),
            }
        }

        let primary_key = match keys.len() {
            0 => Value::Null,
            1 => keys.remove(0),
            _ => Value::Array(keys),
        };

        let cursor_value = self
            .cursor_field
            .as_deref()
            .and_then(|field| lookup(&data, field))
            .filter(|v| !v.is_null())
            .cloned();

        Ok(Record {
            data,
            primary_key,
            cursor_value,
        })
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

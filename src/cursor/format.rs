//! Cursor value formatting
//!
//! Instants are kept as `DateTime<Utc>` internally and only converted to the
//! stream's representation at the edges: request parameters and checkpoints.

use crate::error::{Error, Result};
use crate::types::CursorFormat;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

impl CursorFormat {
    /// Format an instant as request parameter text
    pub fn format(&self, dt: DateTime<Utc>) -> String {
        match self {
            CursorFormat::Date => dt.format(DATE_FORMAT).to_string(),
            CursorFormat::EpochMillis => dt.timestamp_millis().to_string(),
        }
    }

    /// Convert an instant to its persisted checkpoint value
    pub fn to_value(&self, dt: DateTime<Utc>) -> Value {
        match self {
            CursorFormat::Date => Value::String(self.format(dt)),
            CursorFormat::EpochMillis => Value::from(dt.timestamp_millis()),
        }
    }

    /// Parse request parameter text back into an instant
    pub fn parse(&self, s: &str) -> Result<DateTime<Utc>> {
        let s = s.trim();
        match self {
            CursorFormat::Date => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ndt| ndt.and_utc())
                .ok_or_else(|| Error::state(format!("Invalid date cursor: '{s}'"))),
            CursorFormat::EpochMillis => s
                .parse::<i64>()
                .ok()
                .and_then(DateTime::from_timestamp_millis)
                .ok_or_else(|| Error::state(format!("Invalid epoch millisecond cursor: '{s}'"))),
        }
    }

    /// Parse a persisted checkpoint value into an instant
    ///
    /// Epoch-millisecond cursors are accepted as numbers or numeric strings.
    pub fn parse_value(&self, value: &Value) -> Result<DateTime<Utc>> {
        match (self, value) {
            (_, Value::String(s)) => self.parse(s),
            (CursorFormat::EpochMillis, Value::Number(n)) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .ok_or_else(|| Error::state(format!("Invalid epoch millisecond cursor: {n}"))),
            _ => Err(Error::state(format!(
                "Cursor value {value} does not match format {self:?}"
            ))),
        }
    }
}

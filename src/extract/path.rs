//! Field path lookup

use crate::error::{Error, Result};
use serde_json::Value;

/// Look up a value by dot path, with `name[i]` indexing
///
/// A leading `$.` is ignored. Negative indexes count from the end.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        // Handle array indexing like "data[0]" or "items[-1]"
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

            if !name.is_empty() {
                current = current.get(name)?;
            }

            let index: i64 = index_str.parse().ok()?;
            let arr = current.as_array()?;
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_possible_wrap
            )]
            let idx = if index < 0 {
                let from_end = arr.len() as i64 + index;
                if from_end < 0 {
                    return None;
                }
                from_end as usize
            } else {
                index as usize
            };
            current = arr.get(idx)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current)
}

/// Look up a scalar and render it as text
pub fn lookup_scalar(value: &Value, path: &str) -> Option<String> {
    match lookup(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whether a path needs a full JSONPath evaluator
pub(crate) fn is_jsonpath_expression(path: &str) -> bool {
    path.starts_with('$') && (path.contains('*') || path.contains("..") || path.contains('?'))
}

/// Select every match of a JSONPath expression
pub(crate) fn select_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path).map_err(|e| Error::JsonPath {
        message: format!("'{path}': {e}"),
    })?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

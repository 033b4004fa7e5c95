//! Signal extraction from a search response.
//!
//! Walks a dotted path (`hits.total.value`) through nested JSON objects
//! and returns the numeric leaf as an integer.

use serde_json::Value;

use crate::error::{QueryError, QueryResult};

/// Extract the integer signal at `path` from `doc`.
///
/// Every segment must name a key of a JSON object. Numbers are accepted
/// whether encoded as integers or floats; floats are truncated toward
/// zero.
pub fn extract_signal(doc: &Value, path: &str) -> QueryResult<i64> {
    if path.is_empty() {
        return Err(QueryError::EmptyPath);
    }

    let mut current = doc;
    for key in path.split('.') {
        current = current
            .as_object()
            .and_then(|map| map.get(key))
            .ok_or_else(|| QueryError::PathNotFound {
                key: key.to_string(),
            })?;
    }

    match current {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64() {
                // `as` saturates at the i64 bounds.
                Ok(f.trunc() as i64)
            } else {
                Err(QueryError::TypeMismatch {
                    path: path.to_string(),
                    found: "number",
                })
            }
        }
        other => Err(QueryError::TypeMismatch {
            path: path.to_string(),
            found: json_type(other),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

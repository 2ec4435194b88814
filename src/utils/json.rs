//! JSON value helpers.

use serde_json::Value;

/// Recursively drop object fields whose value is `null`.
///
/// Nulls inside arrays are kept; only object members are removed.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

/// Render an id-like JSON value as a correlation id.
///
/// Strings are taken as-is and numbers are stringified. Anything else,
/// including `null`, counts as no id.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

//! Value Sizing Module
//!
//! Approximates the in-memory footprint of JSON values for budget accounting.

use serde_json::Value;

use super::FALLBACK_VALUE_SIZE;

// == Approximate Size ==
/// Estimates how many bytes a JSON value occupies.
///
/// Scalars are charged a fixed cost per type. Strings are charged two bytes
/// per UTF-16 code unit. Arrays and objects are serialized and charged two
/// bytes per UTF-16 code unit of the serialized form, which folds key names
/// and punctuation into the estimate. A value that cannot be serialized is
/// charged a fixed fallback so it still counts against the budget.
pub fn approximate_size(value: &Value) -> usize {
    match value {
        Value::Null => 8,
        Value::Bool(_) => 4,
        Value::Number(_) => 8,
        Value::String(s) => utf16_len(s) * 2,
        Value::Array(_) | Value::Object(_) => match serde_json::to_string(value) {
            Ok(serialized) => utf16_len(&serialized) * 2,
            Err(_) => FALLBACK_VALUE_SIZE,
        },
    }
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

//! Normalization of downstream results into result items.

use serde_json::Value;

/// Arrays pass through unchanged; any other value becomes a one-element sequence.
pub fn into_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

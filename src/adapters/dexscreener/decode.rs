//! Payload decoding
//!
//! Responses are cached as raw JSON and decoded per operation. Records that
//! fail to deserialize are skipped individually instead of failing the whole
//! response.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ports::models::{RawPair, SearchResult};

/// Records of a list endpoint, accepting `{ "data": [...] }` or a bare array
pub fn list_records<T: DeserializeOwned>(payload: &Value) -> Vec<T> {
    let values = match payload {
        Value::Array(values) => Some(values),
        Value::Object(map) => map.get("data").and_then(Value::as_array),
        _ => None,
    };
    values.map(|v| lenient_records(v)).unwrap_or_default()
}

/// Pairs of the token-pairs endpoint: bare array, `{ "pairs": [...] }`, or nothing
pub fn pair_records(payload: &Value) -> Vec<RawPair> {
    let values = match payload {
        Value::Array(values) => Some(values),
        Value::Object(map) => map.get("pairs").and_then(Value::as_array),
        _ => None,
    };
    values.map(|v| lenient_records(v)).unwrap_or_default()
}

/// Search payload; `pairs` being `null` or missing means no results
pub fn search_result(payload: &Value) -> SearchResult {
    let pairs = payload
        .get("pairs")
        .and_then(Value::as_array)
        .map(|values| lenient_records(values))
        .unwrap_or_default();
    SearchResult { pairs }
}

/// Deserialize each value on its own, dropping the ones that do not fit
fn lenient_records<T: DeserializeOwned>(values: &[Value]) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| match T::deserialize(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping malformed record: {}", e);
                None
            }
        })
        .collect()
}

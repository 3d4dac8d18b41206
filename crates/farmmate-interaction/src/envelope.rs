//! Response envelope handling.
//!
//! The backend wraps payloads as `{"message": ..., "data": ..., "error": ...}`
//! on most endpoints but answers bare on some older ones.

use farmmate_core::{FarmmateError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes `T` from a wrapped (`data`) or bare payload.
///
/// An object carrying a `data` key is always treated as wrapped: a null or
/// mismatched `data` is a `DataFormat` error, never a bare decode of the
/// envelope itself.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    match unwrap_data(value) {
        Value::Null => Err(FarmmateError::data_format("response carries no data")),
        data => from_value(data),
    }
}

/// Like [`decode`], but a wrapped `data: null` yields `T::default()`.
///
/// For endpoints whose success payload is optional.
pub fn decode_or_default<T: DeserializeOwned + Default>(value: Value) -> Result<T> {
    match unwrap_data(value) {
        Value::Null => Ok(T::default()),
        data => from_value(data),
    }
}

/// The payload to decode: `data` of a wrapped object, else the value itself.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| FarmmateError::data_format(format!("unexpected response shape: {e}")))
}

/// Human-readable message of an error response body.
pub fn error_message(body: &str) -> String {
    let fallback = || {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "no response body".to_string()
        } else {
            trimmed.chars().take(200).collect()
        }
    };

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    let from_error = match value.get("error") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };

    from_error
        .or_else(|| {
            value
                .get("message")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(fallback)
}

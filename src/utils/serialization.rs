// src/utils/serialization.rs
//! Serialization utilities for the wallet.
//!
//! Provides serialization and deserialization functions for:
//! - JSON data structures
//! - Merging caller-supplied fields into reply objects
//! - Canonical string keys used for set comparisons

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Serializes a value to a JSON string.
///
/// # Arguments
/// * `data` - The value to serialize (must implement `Serialize`)
///
/// # Returns
/// - `Ok(String)` with JSON representation on success
/// - `Err(serde_json::Error)` if serialization fails
pub fn serialize<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(data)
}

/// Deserializes a value from a JSON string.
///
/// # Arguments
/// * `data` - JSON string to deserialize
///
/// # Returns
/// - `Ok(T)` with deserialized value on success
/// - `Err(serde_json::Error)` if deserialization fails
pub fn deserialize<'a, T: Deserialize<'a>>(data: &'a str) -> Result<T, serde_json::Error> {
    serde_json::from_str(data)
}

/// Copies every field of `extra` into `base`, overwriting on collision.
///
/// Non-object `extra` values are ignored.
pub fn merge_into(base: &mut Map<String, Value>, extra: Value) {
    if let Value::Object(fields) = extra {
        for (key, value) in fields {
            base.insert(key, value);
        }
    }
}

/// Canonical JSON text of a value, used as a set key.
pub fn json_key(value: &Value) -> String {
    // serde_json::Map is ordered by key unless `preserve_order` is enabled,
    // so equal objects always stringify identically.
    value.to_string()
}

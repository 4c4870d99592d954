//! Canonical JSON form used for change detection

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::Result;

/// Recursively sort object keys
///
/// Holds regardless of whether `serde_json` preserves insertion order.
pub fn canonicalize(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            JsonValue::Object(sorted)
        }
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Serialize to pretty-printed JSON with stable key order
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let tree = serde_json::to_value(value)?;
    let mut bytes = serde_json::to_vec_pretty(&canonicalize(&tree))?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_is_irrelevant() {
        let a = json!({"b": 1, "a": {"z": true, "y": [ {"k": 1, "j": 2} ]}});
        let b = json!({"a": {"y": [ {"j": 2, "k": 1} ], "z": true}, "b": 1});
        assert_eq!(canonical_json(&a).unwrap(), canonical_json(&b).unwrap());
    }

    #[test]
    fn test_array_order_matters() {
        let a = json!({"stages": [1, 2]});
        let b = json!({"stages": [2, 1]});
        assert_ne!(canonical_json(&a).unwrap(), canonical_json(&b).unwrap());
    }

    #[test]
    fn test_output_is_sorted() {
        let text = String::from_utf8(canonical_json(&json!({"b": 1, "a": 2})).unwrap()).unwrap();
        assert!(text.find("\"a\"").unwrap() < text.find("\"b\"").unwrap());
        assert!(text.ends_with('\n'));
    }
}

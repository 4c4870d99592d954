//! Weakly typed field decoding
//!
//! Manifests are hand-written and often templated, so a stage may carry
//! `refId: 2`, `waitTime: "30"` or `stageEnabled: "true"`. The functions here
//! are used with `#[serde(deserialize_with = ...)]` and accept any scalar that
//! converts losslessly into the target type.

use serde::de::{DeserializeOwned, Deserializer, Error};
use serde::Deserialize;
use serde_json::Value as JsonValue;

fn scalar_to_string(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => Some(String::new()),
        JsonValue::String(s) => Some(s),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn scalar_to_int(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        JsonValue::String(s) => s.trim().parse().ok(),
        JsonValue::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn scalar_to_bool(value: &JsonValue) -> Option<bool> {
    match value {
        JsonValue::Null => Some(false),
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Number(n) => n.as_i64().map(|i| i != 0),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// `skip_serializing_if` helper for flags that default to off
pub fn is_false(b: &bool) -> bool {
    !*b
}

/// A string, accepting numbers and booleans
pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    let shown = value.to_string();
    scalar_to_string(value).ok_or_else(|| D::Error::custom(format!("expected a string, got {shown}")))
}

/// An optional string; null and empty strings become `None`
pub fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let s = string(deserializer)?;
    Ok(if s.is_empty() { None } else { Some(s) })
}

/// An integer, accepting numeric strings
pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(0);
    }
    scalar_to_int(&value).ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}")))
}

/// An optional integer; null and empty strings become `None`
pub fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    match &value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) if s.trim().is_empty() => Ok(None),
        _ => scalar_to_int(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}"))),
    }
}

/// A boolean, accepting `"true"`/`"false"` and `0`/`1`
pub fn boolean<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    scalar_to_bool(&value).ok_or_else(|| D::Error::custom(format!("expected a boolean, got {value}")))
}

/// An optional boolean; null stays `None`
pub fn opt_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    scalar_to_bool(&value)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("expected a boolean, got {value}")))
}

/// A list of strings; a single scalar becomes a one-element list
pub fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    match value {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Array(items) => items
            .into_iter()
            .map(|item| {
                let shown = item.to_string();
                scalar_to_string(item)
                    .ok_or_else(|| D::Error::custom(format!("expected a string list item, got {shown}")))
            })
            .collect(),
        scalar => {
            let shown = scalar.to_string();
            scalar_to_string(scalar)
                .map(|s| vec![s])
                .ok_or_else(|| D::Error::custom(format!("expected a string list, got {shown}")))
        }
    }
}

/// A list of integers, accepting numeric strings
pub fn int_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    match value {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                scalar_to_int(item)
                    .ok_or_else(|| D::Error::custom(format!("expected an integer list item, got {item}")))
            })
            .collect(),
        scalar => scalar_to_int(&scalar)
            .map(|i| vec![i])
            .ok_or_else(|| D::Error::custom(format!("expected an integer list, got {scalar}"))),
    }
}

/// A list of any item type; null becomes an empty list
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "string")]
        name: String,
        #[serde(default, deserialize_with = "opt_int")]
        count: Option<i64>,
        #[serde(default, deserialize_with = "boolean")]
        enabled: bool,
        #[serde(default, deserialize_with = "string_list")]
        refs: Vec<String>,
        #[serde(default, deserialize_with = "int_list")]
        days: Vec<i64>,
        #[serde(default, deserialize_with = "list")]
        triggers: Vec<JsonValue>,
    }

    fn sample(value: JsonValue) -> Sample {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_strings_accept_scalars() {
        assert_eq!(sample(json!({"name": 12})).name, "12");
        assert_eq!(sample(json!({"name": true})).name, "true");
        assert_eq!(sample(json!({"name": null})).name, "");
        assert_eq!(sample(json!({})).name, "");
    }

    #[test]
    fn test_ints_accept_numeric_strings() {
        assert_eq!(sample(json!({"count": "3"})).count, Some(3));
        assert_eq!(sample(json!({"count": 4})).count, Some(4));
        assert_eq!(sample(json!({"count": ""})).count, None);
        assert!(serde_json::from_value::<Sample>(json!({"count": "three"})).is_err());
    }

    #[test]
    fn test_bools_accept_strings_and_numbers() {
        assert!(sample(json!({"enabled": "true"})).enabled);
        assert!(sample(json!({"enabled": 1})).enabled);
        assert!(!sample(json!({"enabled": "false"})).enabled);
        assert!(serde_json::from_value::<Sample>(json!({"enabled": "maybe"})).is_err());
    }

    #[test]
    fn test_lists_accept_scalars() {
        assert_eq!(sample(json!({"refs": [1, "2"]})).refs, vec!["1", "2"]);
        assert_eq!(sample(json!({"refs": 1})).refs, vec!["1"]);
        assert_eq!(sample(json!({"days": ["1", 2]})).days, vec![1, 2]);
        assert!(serde_json::from_value::<Sample>(json!({"refs": [{"a": 1}]})).is_err());
    }

    #[test]
    fn test_null_lists_are_empty() {
        assert!(sample(json!({"triggers": null})).triggers.is_empty());
        assert!(sample(json!({})).triggers.is_empty());
        assert_eq!(sample(json!({"triggers": [{"type": "git"}]})).triggers.len(), 1);
        assert!(serde_json::from_value::<Sample>(json!({"triggers": "git"})).is_err());
    }
}

//! Template filters for writing manifest YAML

use base64::Engine as _;
use minijinja::{Error, ErrorKind, Value};

fn invalid(message: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::InvalidOperation, message.to_string())
}

fn to_json(value: &Value) -> Result<serde_json::Value, Error> {
    serde_json::to_value(value).map_err(invalid)
}

/// Render a value as a YAML block
///
/// Usage: {{ values.triggers | toyaml | nindent(2) }}
pub fn toyaml(value: Value) -> Result<String, Error> {
    let yaml = serde_yaml::to_string(&to_json(&value)?).map_err(invalid)?;
    Ok(yaml.trim_start_matches("---\n").trim_end().to_string())
}

/// Render a value as compact JSON, which is also valid YAML flow syntax
///
/// Usage: parameters: {{ values.jenkins.parameters | tojson }}
pub fn tojson(value: Value) -> Result<String, Error> {
    serde_json::to_string(&to_json(&value)?).map_err(invalid)
}

pub fn b64encode(value: String) -> String {
    base64::engine::general_purpose::STANDARD.encode(value.as_bytes())
}

pub fn b64decode(value: String) -> Result<String, Error> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(value.trim().as_bytes())
        .map_err(|e| invalid(format!("base64 decode error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| invalid(format!("UTF-8 decode error: {e}")))
}

fn text_of(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// Double-quote a scalar, escaping backslashes and quotes
pub fn quote(value: Value) -> String {
    let text = text_of(&value);
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Single-quote a scalar the YAML way (`'` becomes `''`)
pub fn squote(value: Value) -> String {
    format!("'{}'", text_of(&value).replace('\'', "''"))
}

/// Indent every non-empty line by `spaces`
pub fn indent(value: String, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    value
        .lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("{pad}{line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Like `indent`, with a leading newline
///
/// Usage:
/// ```text
/// stages:{{ values.extraStages | toyaml | nindent(2) }}
/// ```
pub fn nindent(value: String, spaces: usize) -> String {
    format!("\n{}", indent(value, spaces))
}

/// Fail the render when a value is missing or empty
///
/// Usage: {{ values.account | required("values.account is required") }}
pub fn required(value: Value, message: Option<String>) -> Result<Value, Error> {
    let missing = value.is_undefined() || value.is_none();
    let blank = value.as_str().is_some_and(str::is_empty);
    if missing || blank {
        let fallback = if missing { "required value is missing" } else { "required value is empty" };
        return Err(invalid(message.unwrap_or_else(|| fallback.to_string())));
    }
    Ok(value)
}

/// True for undefined, none, empty strings and empty collections
pub fn empty(value: Value) -> bool {
    if value.is_undefined() || value.is_none() {
        return true;
    }
    match (value.as_str(), value.len()) {
        (Some(s), _) => s.is_empty(),
        (None, Some(len)) => len == 0,
        (None, None) => false,
    }
}

pub fn haskey(value: Value, key: String) -> bool {
    value.get_attr(&key).is_ok_and(|v| !v.is_undefined())
}

/// Deep merge two maps, the argument wins
///
/// Usage: {{ values.defaults.notification | merge(values.notification) | toyaml }}
pub fn merge(base: Value, overlay: Value) -> Result<Value, Error> {
    let mut base = to_json(&base)?;
    merge_json(&mut base, to_json(&overlay)?);
    Ok(Value::from_serialize(&base))
}

fn merge_json(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Cut a string to at most `length` characters
pub fn trunc(value: String, length: usize) -> String {
    value.chars().take(length).collect()
}

pub fn trimprefix(value: String, prefix: String) -> String {
    value.strip_prefix(prefix.as_str()).unwrap_or(&value).to_string()
}

pub fn trimsuffix(value: String, suffix: String) -> String {
    value.strip_suffix(suffix.as_str()).unwrap_or(&value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toyaml() {
        let value = Value::from_serialize(json!({"type": "git", "branch": "main"}));
        let yaml = toyaml(value).unwrap();
        assert!(yaml.contains("type: git"));
        assert!(yaml.contains("branch: main"));
        assert!(!yaml.ends_with('\n'));
    }

    #[test]
    fn test_tojson() {
        let value = Value::from_serialize(json!(["a", 1]));
        assert_eq!(tojson(value).unwrap(), r#"["a",1]"#);
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote(Value::from("say \"hi\"")), r#""say \"hi\"""#);
        assert_eq!(quote(Value::from(30)), "\"30\"");
        assert_eq!(squote(Value::from("it's")), "'it''s'");
    }

    #[test]
    fn test_indentation() {
        assert_eq!(indent("a: 1\n\nb: 2".to_string(), 2), "  a: 1\n\n  b: 2");
        assert_eq!(nindent("a: 1".to_string(), 4), "\n    a: 1");
    }

    #[test]
    fn test_required() {
        assert!(required(Value::from("prod"), None).is_ok());
        assert!(required(Value::UNDEFINED, None).is_err());
        let err = required(Value::from(""), Some("account is required".to_string())).unwrap_err();
        assert!(err.to_string().contains("account is required"));
    }

    #[test]
    fn test_empty_and_haskey() {
        assert!(empty(Value::UNDEFINED));
        assert!(empty(Value::from("")));
        assert!(empty(Value::from_serialize(json!([]))));
        assert!(!empty(Value::from(0)));
        let map = Value::from_serialize(json!({"account": "prod"}));
        assert!(haskey(map.clone(), "account".to_string()));
        assert!(!haskey(map, "namespace".to_string()));
    }

    #[test]
    fn test_merge() {
        let base = Value::from_serialize(json!({"notify": {"level": "stage", "address": "ops"}}));
        let overlay = Value::from_serialize(json!({"notify": {"address": "devs"}}));
        let merged = to_json(&merge(base, overlay).unwrap()).unwrap();
        assert_eq!(merged, json!({"notify": {"level": "stage", "address": "devs"}}));
    }

    #[test]
    fn test_b64_and_trimming() {
        assert_eq!(b64encode("shop".to_string()), "c2hvcA==");
        assert_eq!(b64decode("c2hvcA==".to_string()).unwrap(), "shop");
        assert!(b64decode("***".to_string()).is_err());
        assert_eq!(trunc("pipeline".to_string(), 4), "pipe");
        assert_eq!(trimprefix("v1.2".to_string(), "v".to_string()), "1.2");
        assert_eq!(trimsuffix("shop.yaml".to_string(), ".yaml".to_string()), "shop");
    }
}

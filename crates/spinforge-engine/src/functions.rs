//! Global functions available in templates

use minijinja::value::Rest;
use minijinja::{Error, ErrorKind, Value};

/// Abort the render with `message`
///
/// Usage: {{ fail("values.env must be dev or prod") }}
pub fn fail(message: String) -> Result<Value, Error> {
    Err(Error::new(ErrorKind::InvalidOperation, message))
}

/// Build a map from key/value pairs
///
/// Usage: {{ dict("account", values.account, "namespace", "shop") | toyaml }}
pub fn dict(args: Rest<Value>) -> Result<Value, Error> {
    if args.len() % 2 != 0 {
        return Err(Error::new(
            ErrorKind::MissingArgument,
            "dict requires an even number of arguments (key-value pairs)",
        ));
    }

    let mut map = serde_json::Map::new();
    for pair in args.chunks(2) {
        let key = pair[0]
            .as_str()
            .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, "dict keys must be strings"))?;
        let value = serde_json::to_value(&pair[1])
            .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))?;
        map.insert(key.to_string(), value);
    }

    Ok(Value::from_serialize(serde_json::Value::Object(map)))
}

pub fn list(args: Rest<Value>) -> Value {
    Value::from(args.0)
}

/// Attribute lookup with a fallback
///
/// Usage: {{ get(values.stages, "wait", 30) }}
pub fn get(obj: Value, key: String, default: Option<Value>) -> Value {
    match obj.get_attr(&key) {
        Ok(v) if !v.is_undefined() => v,
        _ => default.unwrap_or(Value::UNDEFINED),
    }
}

/// First argument that is neither undefined, none nor an empty string
pub fn coalesce(args: Rest<Value>) -> Value {
    args.0
        .into_iter()
        .find(|v| !v.is_undefined() && !v.is_none() && v.as_str() != Some(""))
        .unwrap_or(Value::UNDEFINED)
}

/// Usage: {{ ternary("prod-account", "dev-account", values.production) }}
pub fn ternary(when_true: Value, when_false: Value, condition: Value) -> Value {
    if condition.is_true() { when_true } else { when_false }
}

pub fn tostring(value: Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

pub fn toint(value: Value) -> Result<i64, Error> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    let text = value.as_str().map(str::trim).unwrap_or_default();
    text.parse::<i64>().map_err(|_| {
        Error::new(ErrorKind::InvalidOperation, format!("cannot convert {value} to int"))
    })
}

/// The id the compiler gives the artifact a bake stage produces
///
/// Lets hand-written stages point at a bake output without guessing ids.
///
/// Usage: manifestArtifactId: {{ artifact_id("shop-manifest", "Bake shop") }}
pub fn artifact_id(display_name: String, stage_name: String) -> String {
    spinforge_core::stages::artifact_id(&display_name, &stage_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dict() {
        let value = dict(Rest(vec![Value::from("account"), Value::from("prod")])).unwrap();
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"account": "prod"}));
        assert!(dict(Rest(vec![Value::from("account")])).is_err());
        assert!(dict(Rest(vec![Value::from(1), Value::from(2)])).is_err());
    }

    #[test]
    fn test_get_and_coalesce() {
        let map = Value::from_serialize(json!({"wait": 10}));
        assert_eq!(get(map.clone(), "wait".to_string(), None), Value::from(10));
        assert_eq!(get(map, "missing".to_string(), Some(Value::from(30))), Value::from(30));

        let first = coalesce(Rest(vec![Value::UNDEFINED, Value::from(""), Value::from("shop")]));
        assert_eq!(first.as_str(), Some("shop"));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(ternary(Value::from("a"), Value::from("b"), Value::from(false)).as_str(), Some("b"));
        assert_eq!(tostring(Value::from(42)), "42");
        assert_eq!(toint(Value::from(" 7 ")).unwrap(), 7);
        assert_eq!(toint(Value::from(3)).unwrap(), 3);
        assert!(toint(Value::from("seven")).is_err());
    }

    #[test]
    fn test_artifact_id_is_stable() {
        let id = artifact_id("shop-manifest".to_string(), "Bake shop".to_string());
        assert_eq!(id, artifact_id("shop-manifest".to_string(), "Bake shop".to_string()));
        assert_ne!(id, artifact_id("shop-manifest".to_string(), "Bake web".to_string()));
        assert_eq!(id.len(), 36);
    }
}

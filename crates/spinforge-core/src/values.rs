//! Layered chart values

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::chart::LoadedChart;
use crate::error::{CoreError, Result};

/// Values tree with deep merge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub JsonValue);

impl Values {
    pub fn new() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Load values from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// An empty document yields empty values
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        match value {
            JsonValue::Null => Ok(Self::new()),
            JsonValue::Object(_) => Ok(Self(value)),
            other => Err(CoreError::ValuesMerge {
                message: format!("values must be a mapping, got: {other}"),
            }),
        }
    }

    /// Deep merge `overlay` on top of these values
    ///
    /// Maps merge key by key; scalars and arrays are replaced.
    pub fn merge(&mut self, overlay: &Values) {
        deep_merge(&mut self.0, &overlay.0);
    }

    /// Set a value by dotted path (e.g., "image.tag")
    pub fn set(&mut self, path: &str, value: JsonValue) -> Result<()> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(CoreError::ValuesMerge {
                message: format!("invalid values path: '{path}'"),
            });
        }
        set_nested(&mut self.0, &parts, value);
        Ok(())
    }

    /// Get a value by dotted path
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        path.split('.')
            .try_fold(&self.0, |value, key| value.as_object()?.get(key))
    }

    pub fn inner(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_inner(self) -> JsonValue {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            JsonValue::Object(map) => map.is_empty(),
            JsonValue::Null => true,
            _ => false,
        }
    }
}

fn deep_merge(base: &mut JsonValue, overlay: &JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

fn set_nested(value: &mut JsonValue, path: &[&str], new_value: JsonValue) {
    let Some((key, remaining)) = path.split_first() else {
        *value = new_value;
        return;
    };

    if !value.is_object() {
        *value = JsonValue::Object(serde_json::Map::new());
    }

    if let JsonValue::Object(map) = value {
        let entry = map
            .entry(key.to_string())
            .or_insert(JsonValue::Null);
        set_nested(entry, remaining, new_value);
    }
}

/// Parse `--set key=value` arguments
///
/// Values are typed the way YAML would read them: booleans, null, numbers,
/// inline JSON lists or maps, otherwise strings.
pub fn parse_set_values(set_args: &[String]) -> Result<Values> {
    let mut values = Values::new();

    for arg in set_args {
        let (key, val) = arg.split_once('=').ok_or_else(|| CoreError::ValuesMerge {
            message: format!("Invalid --set format: '{arg}'. Expected key=value"),
        })?;

        let json_value = match val {
            "true" => JsonValue::Bool(true),
            "false" => JsonValue::Bool(false),
            "null" => JsonValue::Null,
            _ => {
                if let Ok(num) = val.parse::<i64>() {
                    JsonValue::Number(num.into())
                } else if let Some(num) = val.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                    JsonValue::Number(num)
                } else if val.starts_with('[') || val.starts_with('{') {
                    serde_json::from_str(val).unwrap_or_else(|_| JsonValue::String(val.to_string()))
                } else {
                    JsonValue::String(val.to_string())
                }
            }
        };

        values.set(key.trim(), json_value)?;
    }

    Ok(values)
}

/// Where the values of one render come from, lowest precedence first
#[derive(Debug, Clone, Default)]
pub struct ValuesSources {
    /// Skip the chart's own `values.yaml`
    pub exclude_defaults: bool,
    /// Values files, merged in order
    pub files: Vec<PathBuf>,
    /// `key=value` overrides, merged last
    pub set: Vec<String>,
}

impl ValuesSources {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.set.is_empty()
    }
}

/// Merge the chart defaults, the values files and the `--set` overrides
pub fn load_values(chart: &LoadedChart, sources: &ValuesSources) -> Result<Values> {
    let use_defaults = !sources.exclude_defaults && chart.values_path.exists();
    if !use_defaults && sources.is_empty() {
        return Err(CoreError::NoValuesSources);
    }

    let mut values = Values::new();

    if use_defaults {
        tracing::debug!(file = %chart.values_path.display(), "Loading chart default values");
        values.merge(&Values::from_file(&chart.values_path)?);
    }

    for file in &sources.files {
        tracing::debug!(file = %file.display(), "Loading values file");
        let layer = Values::from_file(file).map_err(|e| match e {
            CoreError::Io(io) => CoreError::Io(std::io::Error::new(
                io.kind(),
                format!("values file {}: {io}", file.display()),
            )),
            other => other,
        })?;
        values.merge(&layer);
    }

    if !sources.set.is_empty() {
        values.merge(&parse_set_values(&sources.set)?);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deep_merge() {
        let mut base = Values::from_yaml("a:\n  x: 1\n  y: 1\n").unwrap();
        let overlay = Values::from_yaml("a:\n  y: 2\n  z: 3\n").unwrap();
        base.merge(&overlay);

        assert_eq!(base, Values::from_yaml("a: {x: 1, y: 2, z: 3}").unwrap());
    }

    #[test]
    fn test_arrays_are_replaced() {
        let mut base = Values::from_yaml("stages: [bake, deploy]\n").unwrap();
        base.merge(&Values::from_yaml("stages: [wait]\n").unwrap());
        assert_eq!(base.get("stages").unwrap(), &serde_json::json!(["wait"]));
    }

    #[test]
    fn test_set_and_get_nested() {
        let mut values = Values::new();
        values.set("pipeline.stages.wait", JsonValue::from(30)).unwrap();
        assert_eq!(values.get("pipeline.stages.wait").unwrap(), 30);
        assert!(values.get("pipeline.missing").is_none());
        assert!(values.set("pipeline..wait", JsonValue::Null).is_err());
    }

    #[test]
    fn test_parse_set_values() {
        let args = vec![
            "pipeline.name=release".to_string(),
            "replicas=5".to_string(),
            "debug=true".to_string(),
            "ratio=0.5".to_string(),
            "groups=[\"devs\",\"ops\"]".to_string(),
        ];

        let values = parse_set_values(&args).unwrap();

        assert_eq!(values.get("pipeline.name").unwrap(), "release");
        assert_eq!(values.get("replicas").unwrap(), 5);
        assert_eq!(values.get("debug").unwrap(), true);
        assert_eq!(values.get("ratio").unwrap(), 0.5);
        assert_eq!(values.get("groups").unwrap(), &serde_json::json!(["devs", "ops"]));
        assert!(parse_set_values(&["novalue".to_string()]).is_err());
    }

    #[test]
    fn test_non_mapping_values_rejected() {
        assert!(Values::from_yaml("- a\n- b\n").is_err());
        assert!(Values::from_yaml("").unwrap().is_empty());
    }

    fn chart_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Chart.yaml"),
            "apiVersion: v1\nname: shop\nversion: 0.1.0\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("values.yaml"), "app: shop\nwait: 10\nenv: dev\n").unwrap();
        std::fs::create_dir(dir.path().join("templates")).unwrap();
        dir
    }

    #[test]
    fn test_load_values_precedence() {
        let dir = chart_dir();
        let chart = LoadedChart::load(dir.path()).unwrap();
        let prod = dir.path().join("prod.yaml");
        std::fs::write(&prod, "wait: 60\nenv: prod\n").unwrap();

        let sources = ValuesSources {
            files: vec![prod],
            set: vec!["env=canary".to_string()],
            ..Default::default()
        };
        let values = load_values(&chart, &sources).unwrap();

        assert_eq!(values.get("app").unwrap(), "shop");
        assert_eq!(values.get("wait").unwrap(), 60);
        assert_eq!(values.get("env").unwrap(), "canary");
    }

    #[test]
    fn test_load_values_without_defaults() {
        let dir = chart_dir();
        let chart = LoadedChart::load(dir.path()).unwrap();

        let sources = ValuesSources {
            exclude_defaults: true,
            set: vec!["wait=5".to_string()],
            ..Default::default()
        };
        let values = load_values(&chart, &sources).unwrap();
        assert!(values.get("app").is_none());
        assert_eq!(values.get("wait").unwrap(), 5);

        let nothing = ValuesSources {
            exclude_defaults: true,
            ..Default::default()
        };
        assert!(matches!(
            load_values(&chart, &nothing).unwrap_err(),
            CoreError::NoValuesSources
        ));
    }

    #[test]
    fn test_missing_values_file() {
        let dir = chart_dir();
        let chart = LoadedChart::load(dir.path()).unwrap();
        let sources = ValuesSources {
            files: vec![dir.path().join("absent.yaml")],
            ..Default::default()
        };
        let err = load_values(&chart, &sources).unwrap_err();
        assert!(err.is_io());
        assert!(err.to_string().contains("absent.yaml"));
    }
}

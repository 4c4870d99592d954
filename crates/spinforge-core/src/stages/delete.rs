//! `deleteManifest` stage

use serde::{Deserialize, Serialize};

use super::{StageContext, StageHeader, StageSpec};
use crate::error::Result;
use crate::weak;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteManifest {
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Always the owning application
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,

    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Input alias of `location`
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing)]
    pub namespace: Option<String>,

    #[serde(default, deserialize_with = "weak::string_list", skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selectors: Option<LabelSelectors>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<DeleteOptions>,

    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,

    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub manifest_artifact_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelSelectors {
    #[serde(default)]
    pub selectors: Vec<LabelSelector>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelSelector {
    #[serde(default, deserialize_with = "weak::string")]
    pub key: String,
    #[serde(default, deserialize_with = "weak::string")]
    pub kind: String,
    #[serde(default, deserialize_with = "weak::string_list")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOptions {
    #[serde(default, deserialize_with = "weak::boolean")]
    pub cascading: bool,
    #[serde(default, deserialize_with = "weak::int")]
    pub grace_period_seconds: i64,
}

impl StageSpec for DeleteManifest {
    const TYPE: &'static str = "deleteManifest";

    fn expand(&mut self, _header: &StageHeader, ctx: &StageContext<'_>) -> Result<()> {
        self.app = Some(ctx.application.to_string());
        match (&self.location, &self.namespace) {
            (Some(location), _) => self.namespace = Some(location.clone()),
            (None, Some(namespace)) => self.location = Some(namespace.clone()),
            (None, None) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::stages::{StageMap, StageRegistry};
    use serde_json::json;

    fn resolve_one(stage: serde_json::Value) -> StageMap {
        let mut stages: Vec<StageMap> = serde_json::from_value(json!([stage])).unwrap();
        StageRegistry::builtin()
            .resolve_pipeline("shop", "cleanup", &mut stages)
            .unwrap();
        stages.remove(0)
    }

    #[test]
    fn test_namespace_becomes_location() {
        let stage = resolve_one(json!({
            "name": "Delete",
            "type": "deleteManifest",
            "namespace": "staging",
            "kinds": "deployment",
            "options": {"cascading": "true", "gracePeriodSeconds": "30"}
        }));

        assert_eq!(stage["location"], "staging");
        assert_eq!(stage["app"], "shop");
        assert_eq!(stage["kinds"], json!(["deployment"]));
        assert_eq!(stage["options"], json!({"cascading": true, "gracePeriodSeconds": 30}));
        assert!(stage.get("namespace").is_none());
    }

    #[test]
    fn test_location_wins_over_namespace() {
        let stage = resolve_one(json!({
            "name": "Delete",
            "type": "deleteManifest",
            "location": "prod",
            "namespace": "staging"
        }));
        assert_eq!(stage["location"], "prod");
    }
}

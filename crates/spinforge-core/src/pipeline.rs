//! Pipeline objects

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};
use crate::stages::{StageMap, strip_input_only};
use crate::weak;

/// Pipeline spec as stored by the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    /// Lower-cased `metadata.application`
    #[serde(default, deserialize_with = "weak::string")]
    pub application: String,

    /// `metadata.name`
    #[serde(default, deserialize_with = "weak::string")]
    pub name: String,

    #[serde(default, deserialize_with = "weak::int")]
    pub index: i64,

    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub disabled: bool,

    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub keep_waiting_pipelines: bool,

    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub limit_concurrent: bool,

    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub spel_evaluator: Option<String>,

    #[serde(default, deserialize_with = "weak::list", skip_serializing_if = "Vec::is_empty")]
    pub parameter_config: Vec<JsonValue>,

    #[serde(default, deserialize_with = "weak::list", skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<JsonValue>,

    #[serde(default, deserialize_with = "weak::list", skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<JsonValue>,

    #[serde(default, deserialize_with = "weak::list")]
    pub stages: Vec<StageMap>,
}

impl Pipeline {
    /// Decode a spec returned by the platform, ignoring fields it adds
    pub fn from_platform_json(data: &[u8]) -> Result<Self> {
        let pipeline: Pipeline =
            serde_json::from_slice(data).map_err(|e| CoreError::decode("existing pipeline", e))?;
        Ok(pipeline.to_platform())
    }

    /// The spec the platform stores: stages without their input-only keys
    pub fn to_platform(&self) -> Pipeline {
        let mut pipeline = self.clone();
        for stage in &mut pipeline.stages {
            strip_input_only(stage);
        }
        pipeline
    }
}

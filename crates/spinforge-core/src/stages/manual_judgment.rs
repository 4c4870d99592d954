//! `manualJudgment` stage

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::StageSpec;
use crate::weak;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualJudgment {
    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub is_new: bool,

    #[serde(default, deserialize_with = "weak::list")]
    pub judgment_inputs: Vec<JsonValue>,

    #[serde(default, deserialize_with = "weak::boolean")]
    pub propagate_authentication_context: bool,

    #[serde(default, deserialize_with = "weak::string_list", skip_serializing_if = "Vec::is_empty")]
    pub selected_stage_roles: Vec<String>,

    #[serde(default, deserialize_with = "weak::string")]
    pub instructions: String,
}

impl StageSpec for ManualJudgment {
    const TYPE: &'static str = "manualJudgment";
}

#[cfg(test)]
mod tests {
    use crate::stages::{StageMap, StageRegistry};
    use serde_json::json;

    #[test]
    fn test_manual_judgment_fields() {
        let mut stages: Vec<StageMap> = serde_json::from_value(json!([{
            "name": "Approve",
            "type": "manualJudgment",
            "instructions": 42,
            "propagateAuthenticationContext": "true",
            "selectedStageRoles": "release-managers",
            "judgmentInputs": null,
            "isNew": "false",
            "ifStageFails": "halt this branch of the pipeline"
        }]))
        .unwrap();

        StageRegistry::builtin()
            .resolve_pipeline("shop", "release", &mut stages)
            .unwrap();

        let stage = &stages[0];
        assert_eq!(stage["refId"], "1");
        assert_eq!(stage["instructions"], "42");
        assert_eq!(stage["propagateAuthenticationContext"], true);
        assert_eq!(stage["selectedStageRoles"], json!(["release-managers"]));
        assert_eq!(stage["judgmentInputs"], json!([]));
        assert!(stage.get("isNew").is_none());
        assert_eq!(stage["failPipeline"], false);
        assert_eq!(stage["continuePipeline"], false);
    }
}

//! `jenkins` stage

use serde::{Deserialize, Serialize};

use super::{StageMap, StageSpec};
use crate::weak;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jenkins {
    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub is_new: bool,

    #[serde(default, deserialize_with = "weak::string")]
    pub master: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub job: String,

    #[serde(default)]
    pub parameters: StageMap,

    #[serde(default, deserialize_with = "weak::boolean")]
    pub mark_unstable_as_successful: bool,

    #[serde(default, deserialize_with = "weak::boolean")]
    pub wait_for_completion: bool,
}

impl StageSpec for Jenkins {
    const TYPE: &'static str = "jenkins";
}

#[cfg(test)]
mod tests {
    use crate::stages::{StageMap, StageRegistry};
    use serde_json::json;

    #[test]
    fn test_jenkins_fields() {
        let mut stages: Vec<StageMap> = serde_json::from_value(json!([
            {"name": "Pause", "type": "wait", "waitTime": 5},
            {
                "name": "Smoke tests",
                "type": "jenkins",
                "master": "ci",
                "job": 1234,
                "parameters": {"ENV": "prod"},
                "markUnstableAsSuccessful": 1,
                "waitForCompletion": "true",
                "isNew": true,
                "requisiteStageRefIds": 1
            }
        ]))
        .unwrap();

        StageRegistry::builtin()
            .resolve_pipeline("shop", "release", &mut stages)
            .unwrap();

        let stage = &stages[1];
        assert_eq!(stage["refId"], "2");
        assert_eq!(stage["requisiteStageRefIds"], json!(["1"]));
        assert_eq!(stage["master"], "ci");
        assert_eq!(stage["job"], "1234");
        assert_eq!(stage["parameters"], json!({"ENV": "prod"}));
        assert_eq!(stage["markUnstableAsSuccessful"], true);
        assert_eq!(stage["waitForCompletion"], true);
        assert_eq!(stage["isNew"], true);
        assert_eq!(stage["failPipeline"], true);
    }

    #[test]
    fn test_jenkins_rejects_non_boolean_flags() {
        let mut stages: Vec<StageMap> = serde_json::from_value(json!([
            {"name": "Smoke tests", "type": "jenkins", "waitForCompletion": "sometimes"}
        ]))
        .unwrap();

        let err = StageRegistry::builtin()
            .resolve_pipeline("shop", "release", &mut stages)
            .unwrap_err();
        assert!(matches!(err, crate::CoreError::Decode { .. }));
    }
}

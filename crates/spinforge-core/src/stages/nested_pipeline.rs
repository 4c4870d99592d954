//! `pipeline` stage: runs another pipeline

use serde::{Deserialize, Serialize};

use super::{StageContext, StageHeader, StageMap, StageSpec};
use crate::error::Result;
use crate::weak;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedPipeline {
    /// Defaults to the owning application
    #[serde(default, deserialize_with = "weak::string")]
    pub application: String,

    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub is_new: bool,

    /// Id or name of the pipeline to run
    #[serde(default, deserialize_with = "weak::string")]
    pub pipeline: String,

    #[serde(default, skip_serializing_if = "StageMap::is_empty")]
    pub pipeline_parameters: StageMap,

    #[serde(default, deserialize_with = "weak::boolean")]
    pub wait_for_completion: bool,
}

impl StageSpec for NestedPipeline {
    const TYPE: &'static str = "pipeline";

    fn expand(&mut self, _header: &StageHeader, ctx: &StageContext<'_>) -> Result<()> {
        if self.application.is_empty() {
            self.application = ctx.application.to_string();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::stages::{StageMap, StageRegistry};
    use serde_json::json;

    #[test]
    fn test_application_defaults_to_owner() {
        let mut stages: Vec<StageMap> = serde_json::from_value(json!([
            {"name": "Smoke", "type": "pipeline", "pipeline": "smoke-tests", "waitForCompletion": "true"},
            {"name": "Other", "type": "pipeline", "application": "qa", "pipeline": "e2e"}
        ]))
        .unwrap();
        StageRegistry::builtin()
            .resolve_pipeline("shop", "release", &mut stages)
            .unwrap();

        assert_eq!(stages[0]["application"], "shop");
        assert_eq!(stages[0]["waitForCompletion"], true);
        assert_eq!(stages[1]["application"], "qa");
    }
}

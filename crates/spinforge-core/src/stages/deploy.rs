//! `deployManifest` stage

use serde::{Deserialize, Serialize};

use super::{StageContext, StageHeader, StageSpec};
use crate::error::Result;
use crate::weak;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployManifest {
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(default, deserialize_with = "weak::string")]
    pub cloud_provider: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub manifest_artifact_id: String,

    #[serde(default)]
    pub moniker: Moniker,

    #[serde(default, deserialize_with = "weak::string")]
    pub namespace_override: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub source: String,

    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub skip_expression_evaluation: bool,

    /// Explicit bake binding, kept in manifests but not sent to the platform
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub bake_stage_ref_ids: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moniker {
    #[serde(default, deserialize_with = "weak::string")]
    pub app: String,
}

impl StageSpec for DeployManifest {
    const TYPE: &'static str = "deployManifest";

    fn expand(&mut self, header: &StageHeader, ctx: &StageContext<'_>) -> Result<()> {
        self.moniker.app = ctx.application.to_string();
        self.manifest_artifact_id = ctx.bound_artifact_id(header, self.bake_stage_ref_ids.as_deref())?;
        Ok(())
    }
}

//! `runJobManifest` stage

use serde::{Deserialize, Serialize};

use super::{StageContext, StageHeader, StageSpec};
use crate::error::Result;
use crate::weak;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunJobManifest {
    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub is_new: bool,

    #[serde(default, deserialize_with = "weak::string")]
    pub account: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub credentials: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub alias: String,

    /// Defaults to the owning application
    #[serde(default, deserialize_with = "weak::string")]
    pub application: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub cloud_provider: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub source: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub manifest_artifact_id: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub consume_artifact_source: String,

    /// Explicit bake binding, kept in manifests but not sent to the platform
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub job_bake_stage_ref_ids: Option<String>,
}

impl StageSpec for RunJobManifest {
    const TYPE: &'static str = "runJobManifest";

    fn expand(&mut self, header: &StageHeader, ctx: &StageContext<'_>) -> Result<()> {
        if self.application.is_empty() {
            self.application = ctx.application.to_string();
        }
        self.manifest_artifact_id =
            ctx.bound_artifact_id(header, self.job_bake_stage_ref_ids.as_deref())?;
        Ok(())
    }
}

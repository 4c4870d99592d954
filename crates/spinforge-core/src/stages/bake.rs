//! `bakeManifest` stage and artifact identity

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{StageContext, StageHeader, StageMap, StageSpec};
use crate::error::{ReferenceError, Result};
use crate::weak;

/// Namespace for artifact ids; changing it changes every generated id
pub const ARTIFACT_NAMESPACE: Uuid = Uuid::from_u128(0xe8b764da_5fe5_51ed_8af8_c5c6eca28d7a);

/// Deterministic id of an expected artifact
///
/// Hashes `display_name` followed by `stage_name`, so the same manifest always
/// compiles to the same id.
pub fn artifact_id(display_name: &str, stage_name: &str) -> String {
    let mut data = String::with_capacity(display_name.len() + stage_name.len());
    data.push_str(display_name);
    data.push_str(stage_name);
    Uuid::new_v5(&ARTIFACT_NAMESPACE, data.as_bytes()).to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakeManifest {
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(default, deserialize_with = "weak::string")]
    pub output_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_artifacts: Vec<ExpectedArtifact>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_artifacts: Vec<InputArtifact>,

    #[serde(default, deserialize_with = "weak::string")]
    pub namespace: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub template_renderer: String,

    #[serde(default, skip_serializing_if = "StageMap::is_empty")]
    pub overrides: StageMap,

    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub raw_overrides: bool,

    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub evaluate_override_expressions: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_artifact: Option<DefaultArtifact>,

    #[serde(default, deserialize_with = "weak::string")]
    pub display_name: String,

    /// Generated during expansion
    #[serde(default, deserialize_with = "weak::string")]
    pub id: String,

    #[serde(default)]
    pub match_artifact: MatchArtifact,

    #[serde(default, deserialize_with = "weak::opt_bool", skip_serializing_if = "Option::is_none")]
    pub use_default_artifact: Option<bool>,

    #[serde(default, deserialize_with = "weak::opt_bool", skip_serializing_if = "Option::is_none")]
    pub use_prior_artifact: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultArtifact {
    #[serde(default, deserialize_with = "weak::boolean")]
    pub custom_kind: bool,
    #[serde(default, deserialize_with = "weak::string")]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchArtifact {
    #[serde(default, deserialize_with = "weak::string")]
    pub artifact_account: String,
    #[serde(default, deserialize_with = "weak::opt_bool", skip_serializing_if = "Option::is_none")]
    pub custom_kind: Option<bool>,
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "weak::string")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "weak::string")]
    pub kind: String,
}

/// Where the baked template comes from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputArtifact {
    #[serde(default, deserialize_with = "weak::string")]
    pub account: String,
    #[serde(default)]
    pub artifact: ArtifactRef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRef {
    #[serde(default, deserialize_with = "weak::string")]
    pub artifact_account: String,
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "weak::string")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "weak::string")]
    pub kind: String,
    #[serde(default, deserialize_with = "weak::string")]
    pub version: String,
}

impl StageSpec for BakeManifest {
    const TYPE: &'static str = "bakeManifest";

    fn expand(&mut self, header: &StageHeader, _ctx: &StageContext<'_>) -> Result<()> {
        if self.expected_artifacts.is_empty() {
            return Err(ReferenceError::NoExpectedArtifacts {
                stage: header.display_name(),
            }
            .into());
        }
        if self.input_artifacts.is_empty() {
            return Err(ReferenceError::NoInputArtifacts {
                stage: header.display_name(),
            }
            .into());
        }

        for expected in &mut self.expected_artifacts {
            expected.id = artifact_id(&expected.display_name, &header.name);
        }

        // The platform wants the account repeated inside the artifact
        for input in &mut self.input_artifacts {
            input.artifact.artifact_account = input.account.clone();
        }

        Ok(())
    }
}

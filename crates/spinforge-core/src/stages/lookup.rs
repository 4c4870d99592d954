//! Binding a stage to an earlier bake stage

use super::bake::BakeManifest;
use super::{StageContext, StageHeader, StageSpec, decode_stage};
use crate::error::{ReferenceError, Result};

impl StageContext<'_> {
    /// Position (0-based) of the stage a reference points at
    ///
    /// A numeric reference is a 1-based stage number; anything else must match
    /// the `refId` of an already resolved stage.
    pub fn position_of(&self, stage: &str, reference: &str) -> std::result::Result<usize, ReferenceError> {
        let reference = reference.trim();

        if let Ok(number) = reference.parse::<usize>() {
            if number == 0 || number > self.total {
                return Err(ReferenceError::OutOfRange {
                    stage: stage.to_string(),
                    reference: number,
                    count: self.total,
                });
            }
            if number - 1 >= self.index {
                return Err(ReferenceError::ForwardReference {
                    stage: stage.to_string(),
                    reference: number,
                });
            }
            return Ok(number - 1);
        }

        self.resolved
            .iter()
            .position(|s| s.get("refId").and_then(|v| v.as_str()) == Some(reference))
            .ok_or_else(|| ReferenceError::InvalidReference {
                stage: stage.to_string(),
                value: reference.to_string(),
            })
    }

    /// The bake stage bound to `header`, decoded from its resolved form
    pub fn bound_bake(&self, header: &StageHeader, bake_override: Option<&str>) -> Result<BakeManifest> {
        let stage = header.display_name();

        let reference = match bake_override.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => r,
            None => header
                .requisite_stage_ref_ids
                .first()
                .map(String::as_str)
                .ok_or_else(|| ReferenceError::MissingBinding { stage: stage.clone() })?,
        };

        let position = self.position_of(&stage, reference)?;
        let target = &self.resolved[position];

        let found = target.get("type").and_then(|v| v.as_str()).unwrap_or_default();
        if found != BakeManifest::TYPE {
            return Err(ReferenceError::WrongStageType {
                stage,
                reference: position + 1,
                found: found.to_string(),
            }
            .into());
        }

        let bake = decode_stage::<BakeManifest>(target, self)?;
        tracing::debug!(stage = %stage, bake = %bake.header.name, "Bound stage to bake");
        Ok(bake.spec)
    }

    /// `expectedArtifacts[0].id` of the bound bake stage
    pub fn bound_artifact_id(&self, header: &StageHeader, bake_override: Option<&str>) -> Result<String> {
        let bake = self.bound_bake(header, bake_override)?;
        bake.expected_artifacts
            .first()
            .map(|artifact| artifact.id.clone())
            .ok_or_else(|| {
                ReferenceError::NoExpectedArtifacts {
                    stage: header.display_name(),
                }
                .into()
            })
    }
}

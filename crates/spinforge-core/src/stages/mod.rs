//! Stage registry and processor
//!
//! A pipeline's `stages` arrive as loosely typed maps. Each one is decoded
//! into the struct registered for its `type`, expanded (generated ids, bake
//! bindings, fail policy), and encoded back in place. Stages are resolved
//! strictly in order, and a stage may only look at the ones before it.

pub mod bake;
pub mod common;
pub mod delete;
pub mod deploy;
pub mod jenkins;
pub mod lookup;
pub mod manual_judgment;
pub mod nested_pipeline;
pub mod policy;
pub mod run_job;
pub mod wait;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};

use crate::error::{CoreError, ReferenceError, Result};
use crate::weak;

pub use bake::{BakeManifest, ExpectedArtifact, InputArtifact, artifact_id};
pub use common::StageOptions;
pub use delete::DeleteManifest;
pub use deploy::DeployManifest;
pub use jenkins::Jenkins;
pub use manual_judgment::ManualJudgment;
pub use nested_pipeline::NestedPipeline;
pub use policy::{FailPolicy, IfStageFails};
pub use run_job::RunJobManifest;
pub use wait::Wait;

/// A stage as stored in a pipeline spec
pub type StageMap = serde_json::Map<String, JsonValue>;

/// Keys kept in compiled manifests so they recompile to the same stages,
/// but never sent to the platform
pub const INPUT_ONLY_KEYS: &[&str] = &["ifStageFails", "bakeStageRefIds", "jobBakeStageRefIds"];

pub fn strip_input_only(stage: &mut StageMap) {
    for key in INPUT_ONLY_KEYS {
        stage.remove(*key);
    }
}

/// Fields identifying a stage and its position in the execution graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageHeader {
    #[serde(default, deserialize_with = "weak::string")]
    pub name: String,

    #[serde(rename = "type", default, deserialize_with = "weak::string")]
    pub stage_type: String,

    #[serde(default, deserialize_with = "weak::string", skip_serializing_if = "String::is_empty")]
    pub ref_id: String,

    #[serde(default, deserialize_with = "weak::string_list")]
    pub requisite_stage_ref_ids: Vec<String>,
}

impl StageHeader {
    /// Name used in error messages
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("#{}", self.ref_id)
        } else {
            self.name.clone()
        }
    }
}

/// A fully typed stage: shared fields plus the type specific payload
///
/// Keys no struct claims are kept in `extra` and written back untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage<S> {
    #[serde(flatten)]
    pub header: StageHeader,

    #[serde(flatten)]
    pub policy: FailPolicy,

    #[serde(flatten)]
    pub options: StageOptions,

    #[serde(flatten)]
    pub spec: S,

    #[serde(flatten)]
    pub extra: StageMap,
}

/// Pipeline level information handed to each stage during expansion
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// Owning application (already lower-cased)
    pub application: &'a str,
    /// Owning pipeline name
    pub pipeline: &'a str,
    /// 0-based position of the stage being resolved
    pub index: usize,
    /// Stages before `index`, already resolved
    pub resolved: &'a [StageMap],
    /// Number of stages in the pipeline
    pub total: usize,
}

/// A stage type known to the registry
pub trait StageSpec: Serialize + DeserializeOwned {
    /// The `type` discriminator
    const TYPE: &'static str;

    /// Fill derived fields
    fn expand(&mut self, _header: &StageHeader, _ctx: &StageContext<'_>) -> Result<()> {
        Ok(())
    }
}

type Resolver = fn(&StageMap, &str, &StageContext<'_>) -> Result<StageMap>;

/// Decode, expand and encode one stage as `S`
pub fn resolve_as<S: StageSpec>(raw: &StageMap, ref_id: &str, ctx: &StageContext<'_>) -> Result<StageMap> {
    let mut stage: Stage<S> = decode_stage(raw, ctx)?;
    stage.header.ref_id = ref_id.to_string();
    stage.policy.apply();
    stage.spec.expand(&stage.header, ctx)?;

    match serde_json::to_value(&stage)? {
        JsonValue::Object(map) => Ok(map),
        other => Err(CoreError::decode(
            format!("stage {} of pipeline '{}'", ctx.index + 1, ctx.pipeline),
            format!("encoded to a non-object value: {other}"),
        )),
    }
}

/// Decode a stage map into a typed stage
pub fn decode_stage<S: DeserializeOwned>(raw: &StageMap, ctx: &StageContext<'_>) -> Result<Stage<S>> {
    serde_json::from_value(JsonValue::Object(raw.clone())).map_err(|e| {
        CoreError::decode(
            format!("stage {} of pipeline '{}'", ctx.index + 1, ctx.pipeline),
            e,
        )
    })
}

/// Registry of stage types
#[derive(Clone)]
pub struct StageRegistry {
    resolvers: HashMap<&'static str, Resolver>,
}

impl StageRegistry {
    /// Registry without any stage type
    pub fn empty() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Registry with every built-in stage type
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry
            .register::<BakeManifest>()
            .register::<DeployManifest>()
            .register::<DeleteManifest>()
            .register::<RunJobManifest>()
            .register::<ManualJudgment>()
            .register::<Wait>()
            .register::<Jenkins>()
            .register::<NestedPipeline>();
        registry
    }

    /// Add (or replace) a stage type
    pub fn register<S: StageSpec>(&mut self) -> &mut Self {
        self.resolvers.insert(S::TYPE, resolve_as::<S>);
        self
    }

    pub fn contains(&self, stage_type: &str) -> bool {
        self.resolvers.contains_key(stage_type)
    }

    /// Registered types, sorted
    pub fn types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.resolvers.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Resolve every stage of a pipeline in place, in order
    pub fn resolve_pipeline(
        &self,
        application: &str,
        pipeline: &str,
        stages: &mut [StageMap],
    ) -> Result<()> {
        let total = stages.len();
        let mut seen = HashSet::with_capacity(total);

        for index in 0..total {
            let (done, rest) = stages.split_at_mut(index);
            let raw = &rest[0];

            let ctx = StageContext {
                application,
                pipeline,
                index,
                resolved: done,
                total,
            };

            let mut header: StageHeader = serde_json::from_value(JsonValue::Object(raw.clone()))
                .map_err(|e| CoreError::decode(format!("stage {} of pipeline '{pipeline}'", index + 1), e))?;

            if header.ref_id.is_empty() {
                header.ref_id = (index + 1).to_string();
            }
            let ref_id = header.ref_id.clone();

            if !seen.insert(ref_id.clone()) {
                return Err(ReferenceError::DuplicateRefId {
                    stage: header.display_name(),
                    ref_id,
                }
                .into());
            }

            let resolver = self
                .resolvers
                .get(header.stage_type.as_str())
                .ok_or_else(|| CoreError::UnknownStageType {
                    pipeline: pipeline.to_string(),
                    index: index + 1,
                    stage_type: header.stage_type.clone(),
                })?;

            tracing::debug!(
                pipeline,
                stage = %header.name,
                stage_type = %header.stage_type,
                ref_id = %ref_id,
                "Resolving stage"
            );

            let resolved = resolver(raw, &ref_id, &ctx)?;
            rest[0] = resolved;
        }

        Ok(())
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("types", &self.types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stage_maps(value: JsonValue) -> Vec<StageMap> {
        serde_json::from_value(value).unwrap()
    }

    fn sample_pipeline() -> Vec<StageMap> {
        stage_maps(json!([
            {
                "name": "Bake",
                "type": "bakeManifest",
                "templateRenderer": "HELM3",
                "namespace": "web",
                "expectedArtifacts": [{
                    "displayName": "web-chart",
                    "matchArtifact": {"name": "web", "type": "embedded/base64", "artifactAccount": "embedded-artifact"}
                }],
                "inputArtifacts": [{
                    "account": "helm-charts",
                    "artifact": {"name": "web", "type": "helm/chart", "version": "1.2.0"}
                }]
            },
            {"name": "Wait", "type": "wait", "waitTime": "30", "requisiteStageRefIds": [1]},
            {
                "name": "Deploy",
                "type": "deployManifest",
                "account": "prod",
                "cloudProvider": "kubernetes",
                "source": "artifact",
                "requisiteStageRefIds": ["2"],
                "bakeStageRefIds": 1,
                "ifStageFails": "ignore the failure"
            }
        ]))
    }

    #[test]
    fn test_builtin_types() {
        let registry = StageRegistry::builtin();
        assert_eq!(
            registry.types(),
            vec![
                "bakeManifest",
                "deleteManifest",
                "deployManifest",
                "jenkins",
                "manualJudgment",
                "pipeline",
                "runJobManifest",
                "wait"
            ]
        );
    }

    #[test]
    fn test_ref_ids_follow_position() {
        let mut stages = stage_maps(json!([
            {"name": "one", "type": "wait", "waitTime": 1},
            {"name": "two", "type": "wait", "waitTime": 2},
            {"name": "three", "type": "wait", "waitTime": 3}
        ]));
        StageRegistry::builtin()
            .resolve_pipeline("shop", "release", &mut stages)
            .unwrap();

        for (i, stage) in stages.iter().enumerate() {
            assert_eq!(stage["refId"], json!((i + 1).to_string()));
        }
    }

    #[test]
    fn test_user_ref_id_wins() {
        let mut stages = stage_maps(json!([
            {"name": "gate", "type": "manualJudgment", "refId": "gate"},
            {"name": "pause", "type": "wait", "requisiteStageRefIds": ["gate"]}
        ]));
        StageRegistry::builtin()
            .resolve_pipeline("shop", "release", &mut stages)
            .unwrap();

        assert_eq!(stages[0]["refId"], "gate");
        assert_eq!(stages[1]["refId"], "2");
        assert_eq!(stages[1]["requisiteStageRefIds"], json!(["gate"]));
    }

    #[test]
    fn test_duplicate_ref_id() {
        let mut stages = stage_maps(json!([
            {"name": "first", "type": "wait", "refId": "2"},
            {"name": "second", "type": "wait"}
        ]));
        let err = StageRegistry::builtin()
            .resolve_pipeline("shop", "release", &mut stages)
            .unwrap_err();

        match err {
            CoreError::Reference(ReferenceError::DuplicateRefId { stage, ref_id }) => {
                assert_eq!(stage, "second");
                assert_eq!(ref_id, "2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_full_pipeline_resolution() {
        let mut stages = sample_pipeline();
        StageRegistry::builtin()
            .resolve_pipeline("shop", "release", &mut stages)
            .unwrap();

        let artifact = stages[0]["expectedArtifacts"][0]["id"].as_str().unwrap().to_string();
        assert_eq!(artifact, artifact_id("web-chart", "Bake"));
        assert_eq!(stages[0]["inputArtifacts"][0]["artifact"]["artifactAccount"], "helm-charts");

        assert_eq!(stages[1]["waitTime"], 30);
        assert_eq!(stages[1]["requisiteStageRefIds"], json!(["1"]));

        let deploy = &stages[2];
        assert_eq!(deploy["manifestArtifactId"], json!(artifact));
        assert_eq!(deploy["moniker"]["app"], "shop");
        assert_eq!(deploy["continuePipeline"], true);
        assert_eq!(deploy["failPipeline"], false);
        assert_eq!(deploy["ifStageFails"], "ignore the failure");
        assert_eq!(deploy["bakeStageRefIds"], "1");

        let mut platform = deploy.clone();
        strip_input_only(&mut platform);
        assert!(platform.get("ifStageFails").is_none());
        assert!(platform.get("bakeStageRefIds").is_none());
    }

    #[test]
    fn test_resolved_stages_resolve_again_unchanged() {
        let registry = StageRegistry::builtin();
        let mut once = sample_pipeline();
        registry.resolve_pipeline("shop", "release", &mut once).unwrap();

        let mut twice = once.clone();
        registry.resolve_pipeline("shop", "release", &mut twice).unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice[2]["continuePipeline"], true);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let registry = StageRegistry::builtin();
        let mut first = sample_pipeline();
        let mut second = sample_pipeline();
        registry.resolve_pipeline("shop", "release", &mut first).unwrap();
        registry.resolve_pipeline("shop", "release", &mut second).unwrap();

        assert_eq!(
            crate::canonical_json(&first).unwrap(),
            crate::canonical_json(&second).unwrap()
        );
    }

    #[test]
    fn test_unknown_stage_type() {
        let mut stages = stage_maps(json!([
            {"name": "ok", "type": "wait"},
            {"name": "bad", "type": "teleport"}
        ]));
        let err = StageRegistry::builtin()
            .resolve_pipeline("shop", "release", &mut stages)
            .unwrap_err();

        match err {
            CoreError::UnknownStageType { pipeline, index, stage_type } => {
                assert_eq!(pipeline, "release");
                assert_eq!(index, 2);
                assert_eq!(stage_type, "teleport");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unclaimed_keys_are_kept() {
        let mut stages = stage_maps(json!([
            {"name": "pause", "type": "wait", "skipWaitText": "later", "customField": {"a": 1}}
        ]));
        StageRegistry::builtin()
            .resolve_pipeline("shop", "release", &mut stages)
            .unwrap();

        assert_eq!(stages[0]["customField"], json!({"a": 1}));
        assert_eq!(stages[0]["skipWaitText"], "later");
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct CheckPreconditions {
        #[serde(default)]
        preconditions: Vec<JsonValue>,
        #[serde(default)]
        checked_by: String,
    }

    impl StageSpec for CheckPreconditions {
        const TYPE: &'static str = "checkPreconditions";

        fn expand(&mut self, _header: &StageHeader, ctx: &StageContext<'_>) -> Result<()> {
            self.checked_by = ctx.pipeline.to_string();
            Ok(())
        }
    }

    #[test]
    fn test_register_custom_stage() {
        let mut registry = StageRegistry::builtin();
        registry.register::<CheckPreconditions>();

        let mut stages = stage_maps(json!([{"name": "pre", "type": "checkPreconditions"}]));
        registry.resolve_pipeline("shop", "release", &mut stages).unwrap();

        assert_eq!(stages[0]["checkedBy"], "release");
        assert_eq!(stages[0]["failPipeline"], true);
    }
}

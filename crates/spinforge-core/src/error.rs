//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown manifest kind: {kind}")]
    UnknownKind { kind: String },

    #[error("bad api version for kind {kind}, expected: {expected}, got: {found}")]
    ApiVersionMismatch {
        kind: String,
        expected: String,
        found: String,
    },

    #[error("{kind} '{name}' has an invalid name length, {min} characters minimum")]
    NameTooShort {
        kind: String,
        name: String,
        min: usize,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("failed to decode {context}: {message}")]
    Decode { context: String, message: String },

    #[error("pipeline '{pipeline}' stage {index}: unknown stage type '{stage_type}'")]
    UnknownStageType {
        pipeline: String,
        index: usize,
        stage_type: String,
    },

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("manifest path not found: {path}")]
    ManifestPathNotFound { path: String },

    #[error("not a yaml file: {path}")]
    NotYaml { path: String },

    #[error("Chart not found: {path}")]
    ChartNotFound { path: String },

    #[error("Invalid Chart.yaml: {message}")]
    InvalidChart { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Values merge error: {message}")]
    ValuesMerge { message: String },

    #[error("no values files to load: default values are excluded and none were given")]
    NoValuesSources,
}

/// Failures binding one stage to another
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("stage '{stage}' has no bake binding: set a bake stage reference or requisiteStageRefIds")]
    MissingBinding { stage: String },

    #[error("stage '{stage}' references '{value}', which is neither a stage number nor a known refId")]
    InvalidReference { stage: String, value: String },

    #[error("stage '{stage}' references stage {reference}, but the pipeline has {count} stage(s)")]
    OutOfRange {
        stage: String,
        reference: usize,
        count: usize,
    },

    #[error("stage '{stage}' references stage {reference}, which is not before it in the pipeline")]
    ForwardReference { stage: String, reference: usize },

    #[error("stage '{stage}' references stage {reference} of type '{found}', expected a bakeManifest stage")]
    WrongStageType {
        stage: String,
        reference: usize,
        found: String,
    },

    #[error("bake stage '{stage}' has no expected artifacts")]
    NoExpectedArtifacts { stage: String },

    #[error("bake stage '{stage}' has no input artifacts")]
    NoInputArtifacts { stage: String },

    #[error("stage '{stage}' reuses refId '{ref_id}' of an earlier stage")]
    DuplicateRefId { stage: String, ref_id: String },
}

impl CoreError {
    /// Build a decode error for a named context
    pub fn decode(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        CoreError::Decode {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// Whether this is a schema error (kind, version or name validation)
    pub fn is_schema(&self) -> bool {
        matches!(
            self,
            CoreError::UnknownKind { .. }
                | CoreError::ApiVersionMismatch { .. }
                | CoreError::NameTooShort { .. }
                | CoreError::MissingField { .. }
        )
    }

    /// Whether this is an I/O error (missing or unreadable input)
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            CoreError::Io(_)
                | CoreError::ManifestPathNotFound { .. }
                | CoreError::NotYaml { .. }
                | CoreError::ChartNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

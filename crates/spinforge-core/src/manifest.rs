//! Manifest discovery and loading
//!
//! A manifest is a Kubernetes-style document:
//!
//! ```yaml
//! apiVersion: spinnaker.adobe.com/alpha1
//! kind: Pipeline
//! metadata:
//!   name: release
//!   application: shop
//! spec:
//!   stages: []
//! ```
//!
//! Files may hold several documents. Every document is validated against the
//! kind registry and compiled; the first failure aborts the whole load.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::application::Application;
use crate::canonical::canonical_json;
use crate::error::{CoreError, Result};
use crate::kind::{self, Kind};
use crate::pipeline::Pipeline;
use crate::stages::StageRegistry;
use crate::weak;

/// Minimum length of application and pipeline names
pub const MIN_NAME_LEN: usize = 3;

type Map = serde_json::Map<String, JsonValue>;

/// A document before it is routed to its kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default, deserialize_with = "weak::string")]
    pub api_version: String,
    #[serde(default, deserialize_with = "weak::string")]
    pub kind: String,
    #[serde(default)]
    pub metadata: Map,
    #[serde(default)]
    pub spec: Map,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationMetadata {
    #[serde(default, deserialize_with = "weak::string")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    #[serde(default, deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, deserialize_with = "weak::string")]
    pub application: String,
}

/// A compiled `Application` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationManifest {
    pub api_version: String,
    pub kind: Kind,
    pub metadata: ApplicationMetadata,
    pub spec: Application,
}

/// A compiled `Pipeline` document, stages fully resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineManifest {
    pub api_version: String,
    pub kind: Kind,
    pub metadata: PipelineMetadata,
    pub spec: Pipeline,
}

fn check_name(kind: Kind, name: &str) -> Result<()> {
    if name.chars().count() < MIN_NAME_LEN {
        return Err(CoreError::NameTooShort {
            kind: kind.to_string(),
            name: name.to_string(),
            min: MIN_NAME_LEN,
        });
    }
    Ok(())
}

fn decode_part<T: serde::de::DeserializeOwned>(map: Map, context: impl Into<String>) -> Result<T> {
    serde_json::from_value(JsonValue::Object(map)).map_err(|e| CoreError::decode(context, e))
}

impl ApplicationManifest {
    /// Infer the lower-cased name and validate it
    pub fn compile(envelope: Envelope) -> Result<Self> {
        let metadata: ApplicationMetadata = decode_part(envelope.metadata, "application metadata")?;
        let mut spec: Application =
            decode_part(envelope.spec, format!("spec of application '{}'", metadata.name))?;

        // The platform only accepts lower-case application names
        spec.name = metadata.name.to_lowercase();
        check_name(Kind::Application, &spec.name)?;

        Ok(Self {
            api_version: envelope.api_version,
            kind: Kind::Application,
            metadata,
            spec,
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn canonical_json(&self) -> Result<Vec<u8>> {
        canonical_json(&self.spec)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl PipelineManifest {
    /// Infer name and application, validate, then resolve every stage
    pub fn compile(envelope: Envelope, registry: &StageRegistry) -> Result<Self> {
        let metadata: PipelineMetadata = decode_part(envelope.metadata, "pipeline metadata")?;
        let mut spec: Pipeline =
            decode_part(envelope.spec, format!("spec of pipeline '{}'", metadata.name))?;

        spec.name = metadata.name.clone();
        spec.application = metadata.application.to_lowercase();

        if spec.application.is_empty() {
            return Err(CoreError::MissingField {
                field: format!("metadata.application of pipeline '{}'", spec.name),
            });
        }
        check_name(Kind::Pipeline, &spec.name)?;

        registry.resolve_pipeline(&spec.application, &spec.name, &mut spec.stages)?;

        Ok(Self {
            api_version: envelope.api_version,
            kind: Kind::Pipeline,
            metadata,
            spec,
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn application(&self) -> &str {
        &self.spec.application
    }

    /// Canonical JSON of the spec the platform receives
    pub fn canonical_json(&self) -> Result<Vec<u8>> {
        canonical_json(&self.spec.to_platform())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Any compiled document
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledObject {
    Application(ApplicationManifest),
    Pipeline(PipelineManifest),
}

impl CompiledObject {
    pub fn kind(&self) -> Kind {
        match self {
            CompiledObject::Application(_) => Kind::Application,
            CompiledObject::Pipeline(_) => Kind::Pipeline,
        }
    }

    /// Human readable identity, `shop` or `shop/release`
    pub fn display_name(&self) -> String {
        match self {
            CompiledObject::Application(app) => app.name().to_string(),
            CompiledObject::Pipeline(p) => format!("{}/{}", p.application(), p.name()),
        }
    }

    pub fn canonical_json(&self) -> Result<Vec<u8>> {
        match self {
            CompiledObject::Application(app) => app.canonical_json(),
            CompiledObject::Pipeline(p) => p.canonical_json(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        match self {
            CompiledObject::Application(app) => app.to_yaml(),
            CompiledObject::Pipeline(p) => p.to_yaml(),
        }
    }
}

/// Compiled documents grouped by kind, each group in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestSet {
    pub applications: Vec<ApplicationManifest>,
    pub pipelines: Vec<PipelineManifest>,
}

impl ManifestSet {
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty() && self.pipelines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.applications.len() + self.pipelines.len()
    }

    /// Applications first, then pipelines
    pub fn objects(&self) -> impl Iterator<Item = CompiledObject> + '_ {
        self.applications
            .iter()
            .cloned()
            .map(CompiledObject::Application)
            .chain(self.pipelines.iter().cloned().map(CompiledObject::Pipeline))
    }

    /// All documents as one YAML stream
    pub fn to_yaml(&self) -> Result<String> {
        let documents = self
            .objects()
            .map(|object| object.to_yaml())
            .collect::<Result<Vec<_>>>()?;
        Ok(documents.join("---\n"))
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("yaml"))
        .unwrap_or(false)
}

/// YAML files behind `path`: the file itself, or the `.yaml` files directly
/// inside a directory, sorted by name
pub fn discover<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CoreError::ManifestPathNotFound {
            path: path.display().to_string(),
        });
    }

    if path.is_file() {
        if !is_yaml(path) {
            return Err(CoreError::NotYaml {
                path: path.display().to_string(),
            });
        }
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(path).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            CoreError::Io(std::io::Error::other(format!(
                "failed to list {}: {e}",
                path.display()
            )))
        })?;
        let file = entry.path();
        if file.is_file() && is_yaml(file) {
            files.push(file.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Read every manifest behind `path` into one YAML stream
pub fn read_manifests<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut stream = String::new();
    for file in discover(path)? {
        tracing::debug!(file = %file.display(), "Reading manifest file");
        let content = std::fs::read_to_string(&file)?;
        if !stream.is_empty() {
            stream.push_str("\n---\n");
        }
        stream.push_str(&content);
    }
    Ok(stream)
}

/// Compiles YAML streams with a given stage registry
#[derive(Debug, Clone, Default)]
pub struct ManifestLoader {
    registry: StageRegistry,
}

impl ManifestLoader {
    pub fn new(registry: StageRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Compile every document of a YAML stream
    pub fn load_str(&self, yaml: &str) -> Result<ManifestSet> {
        let mut set = ManifestSet::default();

        for (position, document) in serde_yaml::Deserializer::from_str(yaml).enumerate() {
            let value = JsonValue::deserialize(document)?;
            if value.is_null() {
                continue;
            }
            if !value.is_object() {
                return Err(CoreError::decode(
                    format!("manifest document {}", position + 1),
                    "expected a mapping",
                ));
            }

            let envelope: Envelope = serde_json::from_value(value)
                .map_err(|e| CoreError::decode(format!("manifest document {}", position + 1), e))?;

            match kind::validate(&envelope.kind, &envelope.api_version)? {
                Kind::Application => {
                    let app = ApplicationManifest::compile(envelope)?;
                    tracing::debug!(application = %app.name(), "Loaded application manifest");
                    set.applications.push(app);
                }
                Kind::Pipeline => {
                    let pipeline = PipelineManifest::compile(envelope, &self.registry)?;
                    tracing::debug!(
                        application = %pipeline.application(),
                        pipeline = %pipeline.name(),
                        stages = pipeline.spec.stages.len(),
                        "Loaded pipeline manifest"
                    );
                    set.pipelines.push(pipeline);
                }
            }
        }

        Ok(set)
    }

    /// Discover, read and compile every manifest behind `path`
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<ManifestSet> {
        let stream = read_manifests(path)?;
        self.load_str(&stream)
    }
}

/// Compile a YAML stream with the built-in stage types
pub fn load_str(yaml: &str) -> Result<ManifestSet> {
    ManifestLoader::default().load_str(yaml)
}

/// Compile the manifests behind `path` with the built-in stage types
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<ManifestSet> {
    ManifestLoader::default().load_path(path)
}

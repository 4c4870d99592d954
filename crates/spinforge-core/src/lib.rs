//! Spinforge Core - Manifest compiler for Spinnaker applications and pipelines
//!
//! This crate provides the compilation pass behind every Spinforge command:
//! - `kind`: The kind registry (kind -> required API version)
//! - `manifest`: Discovery and loading of multi-document YAML manifests
//! - `application` / `pipeline`: The typed platform objects
//! - `stages`: Stage registry and the per-stage decode/expand/encode pass
//! - `values` / `chart`: Layered values and chart directories

pub mod application;
pub mod canonical;
pub mod chart;
pub mod error;
pub mod kind;
pub mod manifest;
pub mod pipeline;
pub mod stages;
pub mod values;
pub mod weak;

pub use application::{Application, Permissions};
pub use canonical::{canonical_json, canonicalize};
pub use chart::{ChartMetadata, LoadedChart};
pub use error::{CoreError, ReferenceError, Result};
pub use kind::{API_VERSION, Kind};
pub use manifest::{ApplicationManifest, CompiledObject, ManifestLoader, ManifestSet, PipelineManifest};
pub use pipeline::Pipeline;
pub use stages::{StageContext, StageRegistry, StageSpec};
pub use values::{Values, ValuesSources, load_values, parse_set_values};

//! Spinforge Engine - Jinja2 rendering of charts into manifests
//!
//! Charts are directories of MiniJinja templates. Rendering them against the
//! merged values yields manifest documents; with a full render those
//! documents are also compiled into the exact objects the platform stores.

pub mod engine;
pub mod error;
pub mod filters;
pub mod functions;
mod suggestions;

pub use engine::{Engine, EngineBuilder, RenderOptions, RenderedChart, RenderedTemplate};
pub use error::{EngineError, Result, TemplateError, TemplateErrorKind};

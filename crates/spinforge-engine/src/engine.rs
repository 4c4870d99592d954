//! Template engine based on MiniJinja

use minijinja::Environment;
use spinforge_core::chart::is_helper;
use spinforge_core::{LoadedChart, ManifestLoader, StageRegistry, Values};
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result, TemplateError};
use crate::filters;
use crate::functions;

/// Per-render switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Compile each rendered template into the objects the platform stores
    pub full_render: bool,
}

/// One rendered, non-empty template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// File name inside `templates/`
    pub name: String,
    pub content: String,
}

/// Output of a chart render, in template file-name order
#[derive(Debug, Clone, Default)]
pub struct RenderedChart {
    pub templates: Vec<RenderedTemplate>,
}

impl RenderedChart {
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.content.as_str())
    }

    /// Write each template under its own name into `dir`
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.templates.len());
        for template in &self.templates {
            let path = dir.join(&template.name);
            std::fs::write(&path, &template.content)?;
            tracing::debug!(file = %path.display(), "Wrote rendered template");
            written.push(path);
        }
        Ok(written)
    }

    /// All templates as one YAML stream, each headed by its source
    pub fn to_stream(&self) -> String {
        let mut out = String::new();
        for template in &self.templates {
            out.push_str("---\n");
            out.push_str(&format!("# Source: {}\n", template.name));
            out.push_str(&template.content);
        }
        out
    }
}

/// Template engine builder
pub struct EngineBuilder {
    strict_mode: bool,
    registry: StageRegistry,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            strict_mode: true,
            registry: StageRegistry::builtin(),
        }
    }

    /// Fail on undefined variables (default)
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Stage types known to the full-render pass
    pub fn registry(mut self, registry: StageRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            strict_mode: self.strict_mode,
            loader: ManifestLoader::new(self.registry),
        }
    }
}

/// The template engine
pub struct Engine {
    strict_mode: bool,
    loader: ManifestLoader,
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::new().build()
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    fn create_environment(&self) -> Environment<'static> {
        let mut env = Environment::new();

        env.set_undefined_behavior(if self.strict_mode {
            minijinja::UndefinedBehavior::Strict
        } else {
            minijinja::UndefinedBehavior::Lenient
        });
        env.set_keep_trailing_newline(true);

        env.add_filter("toyaml", filters::toyaml);
        env.add_filter("tojson", filters::tojson);
        env.add_filter("b64encode", filters::b64encode);
        env.add_filter("b64decode", filters::b64decode);
        env.add_filter("quote", filters::quote);
        env.add_filter("squote", filters::squote);
        env.add_filter("nindent", filters::nindent);
        env.add_filter("indent", filters::indent);
        env.add_filter("required", filters::required);
        env.add_filter("empty", filters::empty);
        env.add_filter("haskey", filters::haskey);
        env.add_filter("merge", filters::merge);
        env.add_filter("trunc", filters::trunc);
        env.add_filter("trimprefix", filters::trimprefix);
        env.add_filter("trimsuffix", filters::trimsuffix);

        env.add_function("fail", functions::fail);
        env.add_function("dict", functions::dict);
        env.add_function("list", functions::list);
        env.add_function("get", functions::get);
        env.add_function("coalesce", functions::coalesce);
        env.add_function("ternary", functions::ternary);
        env.add_function("tostring", functions::tostring);
        env.add_function("toint", functions::toint);
        env.add_function("artifact_id", functions::artifact_id);

        env
    }

    /// Render a single template string against `values`
    pub fn render_string(&self, template: &str, values: &Values, template_name: &str) -> Result<String> {
        let mut env = self.create_environment();
        env.add_template_owned(template_name.to_string(), template.to_string())
            .map_err(|e| TemplateError::from_minijinja(e, template_name, template))?;

        let tmpl = env
            .get_template(template_name)
            .map_err(|e| TemplateError::from_minijinja(e, template_name, template))?;

        let ctx = minijinja::context! {
            values => values.inner(),
        };

        tmpl.render(ctx)
            .map_err(|e| TemplateError::from_minijinja(e, template_name, template).into())
    }

    /// Render every non-helper template of `chart`
    ///
    /// Helpers (file names starting with `_`) are loaded so that other
    /// templates can import or include them, but produce no output of
    /// their own. Templates that render to whitespace only are dropped.
    pub fn render_chart(&self, chart: &LoadedChart, values: &Values, options: RenderOptions) -> Result<RenderedChart> {
        let mut env = self.create_environment();
        let mut sources = Vec::new();

        for path in chart.template_files()? {
            let name = template_name(&path);
            let source = std::fs::read_to_string(&path)?;
            env.add_template_owned(name.clone(), source.clone())
                .map_err(|e| TemplateError::from_minijinja(e, &name, &source))?;
            sources.push((name, source, is_helper(&path)));
        }

        let ctx = minijinja::context! {
            values => values.inner(),
            chart => &chart.metadata,
        };

        let mut rendered = RenderedChart::default();
        for (name, source, helper) in &sources {
            if *helper {
                continue;
            }

            tracing::debug!(template = %name, "Rendering template");
            let tmpl = env
                .get_template(name)
                .map_err(|e| TemplateError::from_minijinja(e, name, source))?;
            let output = tmpl
                .render(&ctx)
                .map_err(|e| TemplateError::from_minijinja(e, name, source))?;

            let content = if options.full_render {
                self.compile(name, &output)?
            } else {
                output
            };

            if content.trim().is_empty() {
                tracing::debug!(template = %name, "Template rendered empty, skipping");
                continue;
            }

            rendered.templates.push(RenderedTemplate {
                name: name.clone(),
                content: with_trailing_newline(content),
            });
        }

        Ok(rendered)
    }

    /// Run one rendered stream through the compiler and back to YAML
    fn compile(&self, name: &str, output: &str) -> Result<String> {
        let full_render = |source| EngineError::FullRender {
            template: name.to_string(),
            source,
        };
        let set = self.loader.load_str(output).map_err(full_render)?;
        tracing::debug!(template = %name, documents = set.len(), "Compiled rendered template");
        set.to_yaml().map_err(full_render)
    }
}

fn template_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn with_trailing_newline(mut content: String) -> String {
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

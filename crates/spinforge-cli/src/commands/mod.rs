//! CLI commands

pub mod apply;
pub mod delete;
pub mod install;
pub mod plan;
pub mod template;
pub mod uninstall;

use clap::Args;
use spinforge_core::{LoadedChart, ValuesSources, load_values};
use spinforge_engine::{Engine, RenderOptions, RenderedChart};
use std::path::PathBuf;

use crate::error::Result;

/// Chart and values flags shared by the chart commands
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Chart directory
    #[arg(short = 'c', long = "chart")]
    pub chart: PathBuf,

    /// Values file(s) merged over the chart defaults, in order (repeat or comma-separate)
    #[arg(short = 'f', long = "values", value_delimiter = ',')]
    pub values: Vec<PathBuf>,

    /// Set values on the command line (key=value), applied last
    #[arg(long = "set")]
    pub set: Vec<String>,

    /// Ignore the chart's own values.yaml
    #[arg(long)]
    pub exclude_default_values: bool,
}

impl RenderArgs {
    pub fn sources(&self) -> ValuesSources {
        ValuesSources {
            exclude_defaults: self.exclude_default_values,
            files: self.values.clone(),
            set: self.set.clone(),
        }
    }

    /// Load the chart, merge its values and render every template
    pub fn render(&self, full_render: bool) -> Result<RenderedChart> {
        let chart = LoadedChart::load(&self.chart)?;
        tracing::debug!(chart = %chart.metadata.name, version = %chart.metadata.version, "Loaded chart");

        let values = load_values(&chart, &self.sources())?;
        let rendered = Engine::default().render_chart(&chart, &values, RenderOptions { full_render })?;

        if rendered.is_empty() {
            tracing::warn!(chart = %chart.metadata.name, "Chart rendered no documents");
        }
        Ok(rendered)
    }
}

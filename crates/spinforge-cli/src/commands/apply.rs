//! Apply command - save new and changed objects

use spinforge_core::ManifestLoader;
use spinforge_platform::{ReconcileOptions, Reconciler};
use std::path::Path;

use crate::GlobalArgs;
use crate::display;
use crate::error::Result;

pub fn run(global: &GlobalArgs, file: &Path, show_plan: bool) -> Result<()> {
    reconcile(global, file, ReconcileOptions::apply(show_plan))
}

/// Compile everything behind `file` and reconcile it with the platform
pub fn reconcile(global: &GlobalArgs, file: &Path, options: ReconcileOptions) -> Result<()> {
    let set = ManifestLoader::default().load_path(file)?;
    if set.is_empty() {
        tracing::warn!(path = %file.display(), "No manifests found");
        return Ok(());
    }
    tracing::debug!(
        applications = set.applications.len(),
        pipelines = set.pipelines.len(),
        "Compiled manifests"
    );

    let reconciler = Reconciler::new(global.platform()?);
    let reports = reconciler.reconcile_all(&set, options)?;

    for report in &reports {
        display::print_report(report);
    }
    display::print_summary(&reports, options.dry_run);
    Ok(())
}

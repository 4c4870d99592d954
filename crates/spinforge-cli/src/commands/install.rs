//! Install command - render a chart, then apply what it produced

use spinforge_platform::ReconcileOptions;

use crate::GlobalArgs;
use crate::commands::{RenderArgs, apply};
use crate::error::Result;

pub fn run(global: &GlobalArgs, render: &RenderArgs, dry_run: bool, show_plan: bool) -> Result<()> {
    let rendered = render.render(false)?;

    // Removed when dropped, whichever way this returns
    let workdir = tempfile::Builder::new().prefix("spinforge-install-").tempdir()?;
    rendered.write_to(workdir.path())?;

    let options = if dry_run {
        ReconcileOptions::plan()
    } else {
        ReconcileOptions::apply(show_plan)
    };
    apply::reconcile(global, workdir.path(), options)
}

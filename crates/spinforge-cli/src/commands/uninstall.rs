//! Uninstall command - render a chart, then delete what it describes

use crate::GlobalArgs;
use crate::commands::{RenderArgs, delete};
use crate::error::Result;

pub fn run(global: &GlobalArgs, render: &RenderArgs) -> Result<()> {
    let rendered = render.render(false)?;

    let workdir = tempfile::Builder::new().prefix("spinforge-uninstall-").tempdir()?;
    rendered.write_to(workdir.path())?;

    delete::from_file(global, workdir.path())
}

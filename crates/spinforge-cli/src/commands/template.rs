//! Template command - render a chart locally

use console::style;
use std::path::Path;

use crate::commands::RenderArgs;
use crate::error::Result;

pub fn run(render: &RenderArgs, full_render: bool, output: Option<&Path>) -> Result<()> {
    let rendered = render.render(full_render)?;

    match output {
        Some(dir) => {
            for path in rendered.write_to(dir)? {
                println!("{} {}", style("wrote").green(), path.display());
            }
        }
        None => print!("{}", rendered.to_stream()),
    }
    Ok(())
}

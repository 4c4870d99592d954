//! Delete command

use spinforge_core::ManifestLoader;
use spinforge_platform::{ObjectRef, Reconciler};
use std::path::Path;

use crate::GlobalArgs;
use crate::display;
use crate::error::Result;

/// Delete every object described behind `file`, pipelines before applications
pub fn from_file(global: &GlobalArgs, file: &Path) -> Result<()> {
    let set = ManifestLoader::default().load_path(file)?;
    if set.is_empty() {
        tracing::warn!(path = %file.display(), "No manifests found");
        return Ok(());
    }

    let reconciler = Reconciler::new(global.platform()?);
    for (object, outcome) in reconciler.delete_all(&set)? {
        display::print_delete(&object, outcome);
    }
    Ok(())
}

pub fn application(global: &GlobalArgs, name: &str) -> Result<()> {
    delete_one(global, ObjectRef::application(name.to_lowercase()))
}

pub fn pipeline(global: &GlobalArgs, application: &str, name: &str) -> Result<()> {
    delete_one(global, ObjectRef::pipeline(application.to_lowercase(), name))
}

fn delete_one(global: &GlobalArgs, object: ObjectRef) -> Result<()> {
    let reconciler = Reconciler::new(global.platform()?);
    let outcome = reconciler.delete(&object)?;
    display::print_delete(&object, outcome);
    Ok(())
}

//! Plan command - diff manifests against Spinnaker, save nothing

use spinforge_platform::ReconcileOptions;
use std::path::Path;

use crate::GlobalArgs;
use crate::commands::apply;
use crate::error::Result;

pub fn run(global: &GlobalArgs, file: &Path) -> Result<()> {
    apply::reconcile(global, file, ReconcileOptions::plan())
}

//! Chart directories
//!
//! ```text
//! shop/
//!   Chart.yaml
//!   values.yaml
//!   templates/
//!     _helpers.tpl
//!     application.yaml
//!     pipeline.yaml
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::weak;

/// Contents of `Chart.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    #[serde(default, deserialize_with = "weak::string")]
    pub api_version: String,
    #[serde(default, deserialize_with = "weak::string")]
    pub description: String,
    #[serde(default, deserialize_with = "weak::string")]
    pub name: String,
    #[serde(default, deserialize_with = "weak::string")]
    pub version: String,
}

/// A chart found on disk
#[derive(Debug, Clone)]
pub struct LoadedChart {
    pub metadata: ChartMetadata,
    pub root: PathBuf,
    pub templates_dir: PathBuf,
    pub values_path: PathBuf,
}

impl LoadedChart {
    /// Load a chart from a directory
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(CoreError::ChartNotFound {
                path: root.display().to_string(),
            });
        }

        let chart_file = root.join("Chart.yaml");
        if !chart_file.exists() {
            return Err(CoreError::InvalidChart {
                message: format!("Chart.yaml not found in {}", root.display()),
            });
        }

        let content = std::fs::read_to_string(&chart_file)?;
        let metadata: ChartMetadata = serde_yaml::from_str(&content).map_err(|e| CoreError::InvalidChart {
            message: format!("{}: {e}", chart_file.display()),
        })?;

        if metadata.name.trim().is_empty() {
            return Err(CoreError::InvalidChart {
                message: format!("{}: name must not be empty", chart_file.display()),
            });
        }

        Ok(Self {
            metadata,
            templates_dir: root.join("templates"),
            values_path: root.join("values.yaml"),
            root,
        })
    }

    /// Files directly inside `templates/`, sorted by name
    pub fn template_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if !self.templates_dir.is_dir() {
            return Ok(files);
        }

        for entry in walkdir::WalkDir::new(&self.templates_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| CoreError::Io(std::io::Error::other(e.to_string())))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }
}

/// Helper templates are loaded but never rendered on their own
pub fn is_helper(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('_'))
        .unwrap_or(false)
}

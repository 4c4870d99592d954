//! Error types for spinforge-platform

use spinforge_core::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Errors talking to the platform
///
/// Only [`PlatformError::NotFound`] is recoverable; callers turn it into a
/// domain outcome. Everything else aborts the run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlatformError {
    #[error("{object} not found")]
    NotFound { object: String },

    #[error("cannot act on {object}: application '{application}' does not exist")]
    ApplicationMissing { object: String, application: String },

    #[error("renaming an existing pipeline is not supported ({object})")]
    RenameNotSupported { object: String },

    #[error("request for {object} repeated too quickly, try again later")]
    Throttled { object: String },

    #[error("`{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("failed to run '{bin}': {source}\nHint: install the spin CLI or point --spin-bin at it")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::NotFound { .. })
    }
}

//! Platform client backed by the `spin` CLI

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::client::{DeleteOutcome, ObjectRef, PlatformClient};
use crate::error::{PlatformError, Result};

/// Runs `spin <kind> <action> ...` with a fixed `--config`
#[derive(Debug, Clone)]
pub struct SpinCli {
    bin: PathBuf,
    config: PathBuf,
}

enum Action<'a> {
    Get,
    Save(&'a Path),
    Delete,
}

impl SpinCli {
    pub fn new(bin: impl Into<PathBuf>, config: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            config: config.into(),
        }
    }

    pub fn config(&self) -> &Path {
        &self.config
    }

    fn args(object: &ObjectRef, action: Action<'_>) -> Vec<String> {
        let file;
        let parts: Vec<&str> = match (object, action) {
            (ObjectRef::Application { name }, Action::Get) => vec!["application", "get", name.as_str()],
            (ObjectRef::Application { name }, Action::Delete) => vec!["application", "delete", name.as_str()],
            (ObjectRef::Pipeline { application, name }, Action::Get) => {
                vec!["pipeline", "get", "--application", application.as_str(), "--name", name.as_str()]
            }
            (ObjectRef::Pipeline { application, name }, Action::Delete) => {
                vec!["pipeline", "delete", "--application", application.as_str(), "--name", name.as_str()]
            }
            (object, Action::Save(path)) => {
                file = path.display().to_string();
                let kind = match object {
                    ObjectRef::Application { .. } => "application",
                    ObjectRef::Pipeline { .. } => "pipeline",
                };
                vec![kind, "save", "--file", file.as_str()]
            }
        };
        parts.into_iter().map(str::to_string).collect()
    }

    fn run(&self, object: &ObjectRef, action: Action<'_>) -> Result<Vec<u8>> {
        let args = Self::args(object, action);
        tracing::debug!(bin = %self.bin.display(), args = ?args, "Running spin");

        let output = Command::new(&self.bin)
            .arg("--config")
            .arg(&self.config)
            .args(&args)
            .output()
            .map_err(|source| PlatformError::Spawn {
                bin: self.bin.display().to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let mut message = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if message.is_empty() {
            message = String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
        Err(classify(object, &format!("spin {}", args.join(" ")), &message))
    }
}

/// Whether a line of `message` starts with the HTTP status `code` (`404 `, `404:`)
fn has_status(message: &str, code: &str) -> bool {
    message.lines().any(|line| {
        line.trim_start()
            .strip_prefix(code)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == ':'))
    })
}

/// Map a failed `spin` invocation onto the error taxonomy
pub fn classify(object: &ObjectRef, command: &str, message: &str) -> PlatformError {
    let subject = object.to_string();
    let lower = message.to_lowercase();

    if lower.contains("unhandled response 404") || lower.contains("unhandled response 403") {
        PlatformError::Throttled { object: subject }
    } else if has_status(&lower, "404") || lower.contains("not found") || lower.contains("does not exist") {
        PlatformError::NotFound { object: subject }
    } else if has_status(&lower, "403") {
        PlatformError::ApplicationMissing {
            object: subject,
            application: object.owner().to_string(),
        }
    } else if has_status(&lower, "400") && matches!(object, ObjectRef::Pipeline { .. }) {
        PlatformError::RenameNotSupported { object: subject }
    } else {
        PlatformError::Command {
            command: command.to_string(),
            stderr: message.to_string(),
        }
    }
}

impl PlatformClient for SpinCli {
    fn get(&self, object: &ObjectRef) -> Result<Option<Vec<u8>>> {
        match self.run(object, Action::Get) {
            Ok(body) if String::from_utf8_lossy(&body).trim().is_empty() => Ok(None),
            Ok(body) => Ok(Some(body)),
            Err(e) if e.is_not_found() => {
                tracing::info!("{object} not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, object: &ObjectRef, spec_path: &Path) -> Result<()> {
        self.run(object, Action::Save(spec_path))?;
        tracing::info!("{object} updated successfully");
        Ok(())
    }

    fn delete(&self, object: &ObjectRef) -> Result<DeleteOutcome> {
        match self.run(object, Action::Delete) {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.is_not_found() => Ok(DeleteOutcome::AlreadyAbsent),
            Err(e) => Err(e),
        }
    }
}

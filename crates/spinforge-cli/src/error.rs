//! CLI error type
//!
//! Every failure ends up here so that `main` can print one diagnostic and
//! pick the exit code from the error category.

use miette::Diagnostic;
use spinforge_core::CoreError;
use spinforge_engine::{EngineError, TemplateError};
use spinforge_platform::PlatformError;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Schema, decode, reference or values failure
    #[error("Validation failed: {message}")]
    #[diagnostic(code(spinforge::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] TemplateError),

    #[error("Chart error: {message}")]
    #[diagnostic(code(spinforge::cli::chart))]
    Chart {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Platform error: {message}")]
    #[diagnostic(code(spinforge::cli::platform))]
    Platform {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("IO error: {message}")]
    #[diagnostic(code(spinforge::cli::io))]
    Io { message: String },

    #[error("{message}")]
    #[diagnostic(code(spinforge::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Template(_) => exit_codes::TEMPLATE_ERROR,
            CliError::Chart { .. } => exit_codes::CHART_ERROR,
            CliError::Platform { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
        }
    }

    pub fn usage(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ChartNotFound { .. } | CoreError::InvalidChart { .. } => CliError::Chart {
                message,
                help: Some("A chart is a directory with Chart.yaml, values.yaml and templates/".to_string()),
            },
            CoreError::NoValuesSources => CliError::usage(message, "Pass -f/--values or --set, or keep the chart's values.yaml"),
            ref e if e.is_io() => CliError::Io { message },
            CoreError::UnknownKind { .. } | CoreError::ApiVersionMismatch { .. } => CliError::Validation {
                message,
                help: Some(format!(
                    "Supported kinds are Application and Pipeline, with apiVersion {}",
                    spinforge_core::API_VERSION
                )),
            },
            CoreError::UnknownStageType { .. } => CliError::Validation {
                message,
                help: Some(format!(
                    "Known stage types: {}",
                    spinforge_core::StageRegistry::builtin().types().join(", ")
                )),
            },
            _ => CliError::Validation { message, help: None },
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Template(e) => CliError::Template(e),
            EngineError::FullRender { template, source } => match CliError::from(source) {
                CliError::Validation { message, help } => CliError::Validation {
                    message: format!("{template}: {message}"),
                    help,
                },
                other => other,
            },
            EngineError::Core(e) => CliError::from(e),
            EngineError::Io(e) => CliError::from(e),
        }
    }
}

impl From<PlatformError> for CliError {
    fn from(err: PlatformError) -> Self {
        let help = match &err {
            PlatformError::ApplicationMissing { .. } => {
                Some("Create the application first: put its Application manifest next to the pipeline".to_string())
            }
            PlatformError::RenameNotSupported { .. } => {
                Some("Delete the old pipeline, then apply the renamed one".to_string())
            }
            PlatformError::Spawn { .. } => Some("Set --spin-bin or SPINFORGE_SPIN_BIN".to_string()),
            _ => None,
        };
        match err {
            PlatformError::Core(e) => CliError::from(e),
            other => CliError::Platform {
                message: other.to_string(),
                help,
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_categories() {
        let schema = CliError::from(CoreError::NameTooShort {
            kind: "Pipeline".to_string(),
            name: "ab".to_string(),
            min: 3,
        });
        assert_eq!(schema.exit_code(), exit_codes::VALIDATION_ERROR);

        let missing = CliError::from(CoreError::ManifestPathNotFound {
            path: "nope".to_string(),
        });
        assert_eq!(missing.exit_code(), exit_codes::IO_ERROR);

        let chart = CliError::from(CoreError::ChartNotFound {
            path: "chart".to_string(),
        });
        assert_eq!(chart.exit_code(), exit_codes::CHART_ERROR);
    }

    #[test]
    fn test_platform_errors_are_fatal() {
        let err = CliError::from(PlatformError::RenameNotSupported {
            object: "pipeline 'release'".to_string(),
        });
        assert_eq!(err.exit_code(), exit_codes::ERROR);
        assert!(err.to_string().contains("renaming"));
    }

    #[test]
    fn test_full_render_errors_name_the_template() {
        let err = CliError::from(EngineError::FullRender {
            template: "pipeline.yaml".to_string(),
            source: CoreError::MissingField {
                field: "metadata.application".to_string(),
            },
        });
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_ERROR);
        assert!(err.to_string().contains("pipeline.yaml"));
    }
}

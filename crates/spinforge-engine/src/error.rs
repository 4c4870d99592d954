//! Engine error types

use miette::{Diagnostic, NamedSource, SourceSpan};
use spinforge_core::CoreError;
use thiserror::Error;

use crate::suggestions::{
    AVAILABLE_FILTERS, AVAILABLE_FUNCTIONS, did_you_mean, unknown_filter_in, unknown_function_in,
};

#[derive(Error, Debug, Diagnostic)]
pub enum EngineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] TemplateError),

    /// A rendered template did not compile into platform objects
    #[error("full render of template '{template}' failed: {source}")]
    #[diagnostic(code(spinforge::template::full_render))]
    FullRender {
        template: String,
        #[source]
        source: CoreError,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// The compilation error behind this failure, if any
    pub fn core(&self) -> Option<&CoreError> {
        match self {
            Self::FullRender { source, .. } => Some(source),
            Self::Core(source) => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateErrorKind {
    UndefinedVariable,
    UnknownFilter,
    UnknownFunction,
    SyntaxError,
    TypeError,
    InvalidOperation,
    Other,
}

/// Template failure pointing at the offending line
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(spinforge::template::render))]
pub struct TemplateError {
    pub message: String,

    pub kind: TemplateErrorKind,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("error occurred here")]
    pub span: Option<SourceSpan>,

    #[help]
    pub suggestion: Option<String>,
}

impl TemplateError {
    pub fn from_minijinja(err: minijinja::Error, template_name: &str, template_source: &str) -> Self {
        let kind = categorize(&err);
        let line = err.line().and_then(|n| template_source.lines().nth(n.saturating_sub(1)));
        let span = err.line().and_then(|n| calculate_span(template_source, n));

        let message = match err.detail() {
            Some(detail) => format!("{}: {detail}", kind_label(kind, &err)),
            None => kind_label(kind, &err),
        };

        Self {
            message,
            kind,
            src: NamedSource::new(template_name, template_source.to_string()),
            span,
            suggestion: suggest(kind, line),
        }
    }

    /// An error without source mapping
    pub fn simple(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: TemplateErrorKind::Other,
            src: NamedSource::new("<unknown>", String::new()),
            span: None,
            suggestion: None,
        }
    }

    pub fn kind(&self) -> TemplateErrorKind {
        self.kind
    }
}

fn categorize(err: &minijinja::Error) -> TemplateErrorKind {
    use minijinja::ErrorKind;

    match err.kind() {
        ErrorKind::UndefinedError => TemplateErrorKind::UndefinedVariable,
        ErrorKind::UnknownFilter => TemplateErrorKind::UnknownFilter,
        ErrorKind::UnknownFunction => TemplateErrorKind::UnknownFunction,
        ErrorKind::SyntaxError => TemplateErrorKind::SyntaxError,
        ErrorKind::InvalidOperation => TemplateErrorKind::InvalidOperation,
        ErrorKind::NonPrimitive | ErrorKind::NonKey => TemplateErrorKind::TypeError,
        _ => TemplateErrorKind::Other,
    }
}

fn kind_label(kind: TemplateErrorKind, err: &minijinja::Error) -> String {
    match kind {
        TemplateErrorKind::UndefinedVariable => "undefined variable".to_string(),
        TemplateErrorKind::UnknownFilter => "unknown filter".to_string(),
        TemplateErrorKind::UnknownFunction => "unknown function".to_string(),
        TemplateErrorKind::SyntaxError => "syntax error".to_string(),
        _ => err.kind().to_string(),
    }
}

fn suggest(kind: TemplateErrorKind, line: Option<&str>) -> Option<String> {
    match kind {
        TemplateErrorKind::UndefinedVariable => {
            if line.is_some_and(|l| l.contains("value.") || l.contains("Values.")) {
                Some("Chart values are available as `values` (lower case, plural).".to_string())
            } else {
                Some("Check the spelling, or give the value a fallback with `| default(...)`.".to_string())
            }
        }
        TemplateErrorKind::UnknownFilter => line
            .and_then(unknown_filter_in)
            .map(|name| did_you_mean(&name, AVAILABLE_FILTERS, "filter")),
        TemplateErrorKind::UnknownFunction => line
            .and_then(unknown_function_in)
            .map(|name| did_you_mean(&name, AVAILABLE_FUNCTIONS, "function")),
        TemplateErrorKind::SyntaxError => Some(
            "Check bracket matching: `{{ }}` for expressions, `{% %}` for statements, `{# #}` for comments"
                .to_string(),
        ),
        _ => None,
    }
}

/// Span covering line `line_num` (1-based)
fn calculate_span(source: &str, line_num: usize) -> Option<SourceSpan> {
    let mut offset = 0;
    for (index, line) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line_num {
            let len = line.trim_end_matches(['\n', '\r']).len();
            return Some(SourceSpan::new(offset.into(), len));
        }
        offset += line.len();
    }
    None
}

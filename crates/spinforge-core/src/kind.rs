//! Kind registry
//!
//! Maps a manifest's `kind` to the API version it must declare.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// API version shared by all manifest kinds
pub const API_VERSION: &str = "spinnaker.adobe.com/alpha1";

/// Manifest kinds understood by the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Application,
    Pipeline,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Application => "Application",
            Kind::Pipeline => "Pipeline",
        }
    }

    /// API version registered for this kind
    pub fn api_version(&self) -> &'static str {
        // Every registered entry is keyed by `as_str`
        KINDS
            .get(self.as_str())
            .map(|spec| spec.api_version)
            .unwrap_or(API_VERSION)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry entry for a kind
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    pub kind: Kind,
    pub api_version: &'static str,
}

static KINDS: phf::Map<&'static str, KindSpec> = phf::phf_map! {
    "Application" => KindSpec { kind: Kind::Application, api_version: API_VERSION },
    "Pipeline" => KindSpec { kind: Kind::Pipeline, api_version: API_VERSION },
};

/// Look up a kind without checking its version
pub fn lookup(kind: &str) -> Option<&'static KindSpec> {
    KINDS.get(kind)
}

/// Validate a `kind`/`apiVersion` pair
pub fn validate(kind: &str, api_version: &str) -> Result<Kind> {
    let spec = lookup(kind).ok_or_else(|| CoreError::UnknownKind {
        kind: kind.to_string(),
    })?;

    if spec.api_version != api_version {
        return Err(CoreError::ApiVersionMismatch {
            kind: kind.to_string(),
            expected: spec.api_version.to_string(),
            found: api_version.to_string(),
        });
    }

    Ok(spec.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_known_kinds() {
        assert_eq!(validate("Application", API_VERSION).unwrap(), Kind::Application);
        assert_eq!(validate("Pipeline", API_VERSION).unwrap(), Kind::Pipeline);
    }

    #[test]
    fn test_validate_unknown_kind() {
        let err = validate("Deployment", API_VERSION).unwrap_err();
        assert!(matches!(err, CoreError::UnknownKind { ref kind } if kind == "Deployment"));
        assert!(err.is_schema());
    }

    #[test]
    fn test_validate_version_mismatch() {
        let err = validate("Pipeline", "spinnaker.adobe.com/v1").unwrap_err();
        match err {
            CoreError::ApiVersionMismatch { expected, found, .. } => {
                assert_eq!(expected, API_VERSION);
                assert_eq!(found, "spinnaker.adobe.com/v1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_kind_is_case_sensitive() {
        assert!(validate("pipeline", API_VERSION).is_err());
    }

    #[test]
    fn test_api_version_lookup() {
        assert_eq!(Kind::Application.api_version(), API_VERSION);
        assert_eq!(Kind::Pipeline.to_string(), "Pipeline");
    }
}

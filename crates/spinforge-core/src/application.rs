//! Application objects

use serde::{Deserialize, Serialize};

use crate::weak;

/// Application spec as stored by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Comma separated provider list, e.g. `kubernetes`
    #[serde(default, deserialize_with = "weak::string")]
    pub cloud_providers: String,

    #[serde(default, deserialize_with = "weak::string")]
    pub email: String,

    /// Lower-cased `metadata.name`
    #[serde(default, deserialize_with = "weak::string")]
    pub name: String,

    #[serde(default)]
    pub permissions: Permissions,
}

/// Groups allowed to act on an application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(rename = "EXECUTE", alias = "execute", default, deserialize_with = "weak::string_list")]
    pub execute: Vec<String>,

    #[serde(rename = "READ", alias = "read", default, deserialize_with = "weak::string_list")]
    pub read: Vec<String>,

    #[serde(rename = "WRITE", alias = "write", default, deserialize_with = "weak::string_list")]
    pub write: Vec<String>,
}

impl Application {
    /// Decode a spec returned by the platform, ignoring fields it adds
    pub fn from_platform_json(data: &[u8]) -> crate::Result<Self> {
        serde_json::from_slice(data).map_err(|e| crate::CoreError::decode("existing application", e))
    }
}

//! `wait` stage

use serde::{Deserialize, Serialize};

use super::StageSpec;
use crate::weak;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wait {
    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub is_new: bool,

    #[serde(default, deserialize_with = "weak::string")]
    pub skip_wait_text: String,

    /// Seconds
    #[serde(default, deserialize_with = "weak::int")]
    pub wait_time: i64,
}

impl StageSpec for Wait {
    const TYPE: &'static str = "wait";
}

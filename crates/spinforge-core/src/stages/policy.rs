//! Failure policy of a stage
//!
//! Users pick one of four phrases through `ifStageFails`; the platform wants
//! three booleans. The phrase stays in the compiled manifest, normalized, and
//! is stripped from what the platform receives.

use serde::{Deserialize, Serialize};

use crate::weak;

pub const HALT_PIPELINE: &str = "halt the entire pipeline";
pub const HALT_BRANCH: &str = "halt this branch of the pipeline";
pub const HALT_BRANCH_FAIL_PIPELINE: &str =
    "halt this branch and fail the pipeline once other branches complete";
pub const IGNORE_FAILURE: &str = "ignore the failure";

/// The four recognized `ifStageFails` choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IfStageFails {
    #[default]
    HaltPipeline,
    HaltBranch,
    HaltBranchFailPipeline,
    IgnoreFailure,
}

impl IfStageFails {
    /// Parse the user phrase; anything unrecognized halts the pipeline
    pub fn parse(phrase: Option<&str>) -> Self {
        match phrase.map(str::trim) {
            Some(HALT_BRANCH) => IfStageFails::HaltBranch,
            Some(HALT_BRANCH_FAIL_PIPELINE) => IfStageFails::HaltBranchFailPipeline,
            Some(IGNORE_FAILURE) => IfStageFails::IgnoreFailure,
            _ => IfStageFails::HaltPipeline,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IfStageFails::HaltPipeline => HALT_PIPELINE,
            IfStageFails::HaltBranch => HALT_BRANCH,
            IfStageFails::HaltBranchFailPipeline => HALT_BRANCH_FAIL_PIPELINE,
            IfStageFails::IgnoreFailure => IGNORE_FAILURE,
        }
    }

    /// `(continuePipeline, failPipeline, completeOtherBranchesThenFail)`
    pub fn flags(&self) -> (bool, bool, bool) {
        match self {
            IfStageFails::HaltPipeline => (false, true, false),
            IfStageFails::HaltBranch => (false, false, false),
            IfStageFails::HaltBranchFailPipeline => (false, false, true),
            IfStageFails::IgnoreFailure => (true, false, false),
        }
    }
}

/// Fail policy fields shared by every stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailPolicy {
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub if_stage_fails: Option<String>,

    #[serde(default, deserialize_with = "weak::boolean")]
    pub continue_pipeline: bool,

    #[serde(default, deserialize_with = "weak::boolean")]
    pub fail_pipeline: bool,

    #[serde(default, deserialize_with = "weak::boolean")]
    pub complete_other_branches_then_fail: bool,
}

impl FailPolicy {
    /// Overwrite the booleans from `ifStageFails`
    pub fn apply(&mut self) {
        let choice = IfStageFails::parse(self.if_stage_fails.as_deref());
        if self.if_stage_fails.is_some() {
            self.if_stage_fails = Some(choice.as_str().to_string());
        }
        let (cont, fail, complete) = choice.flags();
        self.continue_pipeline = cont;
        self.fail_pipeline = fail;
        self.complete_other_branches_then_fail = complete;
    }
}

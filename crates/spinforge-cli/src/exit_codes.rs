//! Exit codes, following sysexits.h where one applies

/// Success, including "no changes detected" and "already absent"
pub const SUCCESS: i32 = 0;

/// Unspecified failure, including fatal platform responses
pub const ERROR: i32 = 1;

/// A manifest or values failed schema, decode or reference checks
pub const VALIDATION_ERROR: i32 = 2;

pub const TEMPLATE_ERROR: i32 = 3;

/// Invalid chart directory or Chart.yaml
pub const CHART_ERROR: i32 = 4;

/// Missing or unreadable input, unwritable output
pub const IO_ERROR: i32 = 5;

pub const USAGE_ERROR: i32 = 64;

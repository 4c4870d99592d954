//! Options every stage type accepts

use serde::{Deserialize, Serialize};

use crate::weak;

/// Execution window, notification and toggling options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOptions {
    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub restrict_execution_during_time_window: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_execution_window: Option<ExecutionWindow>,

    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub skip_window_text: Option<String>,

    /// Only honoured by some stage types (deploy, judgment, run job)
    #[serde(default, deserialize_with = "weak::opt_int", skip_serializing_if = "Option::is_none")]
    pub stage_timeout_ms: Option<i64>,

    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub fail_on_failed_expressions: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_enabled: Option<StageEnabled>,

    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub send_notifications: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<Notification>,

    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionWindow {
    #[serde(default, deserialize_with = "weak::int_list", skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub whitelist: Vec<TimeRange>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<Jitter>,
}

/// One allowed time range, in 24h clock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    #[serde(default, deserialize_with = "weak::int")]
    pub start_hour: i64,
    #[serde(default, deserialize_with = "weak::int")]
    pub start_min: i64,
    #[serde(default, deserialize_with = "weak::int")]
    pub end_hour: i64,
    #[serde(default, deserialize_with = "weak::int")]
    pub end_min: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jitter {
    #[serde(default, deserialize_with = "weak::boolean")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "weak::opt_int", skip_serializing_if = "Option::is_none")]
    pub min_delay: Option<i64>,
    #[serde(default, deserialize_with = "weak::opt_int", skip_serializing_if = "Option::is_none")]
    pub max_delay: Option<i64>,
    #[serde(default, deserialize_with = "weak::boolean", skip_serializing_if = "weak::is_false")]
    pub skip_manual: bool,
}

/// Conditional execution of a stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageEnabled {
    #[serde(default, deserialize_with = "weak::string")]
    pub expression: String,
    #[serde(rename = "type", default = "StageEnabled::default_type", deserialize_with = "weak::string")]
    pub kind: String,
}

impl StageEnabled {
    fn default_type() -> String {
        "expression".to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default, deserialize_with = "weak::string")]
    pub address: String,
    #[serde(default, deserialize_with = "weak::opt_string", skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "weak::string")]
    pub kind: String,
    #[serde(default, deserialize_with = "weak::string_list", skip_serializing_if = "Vec::is_empty")]
    pub when: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<NotificationMessage>,
}

/// Custom notification texts, keyed the way the platform stores them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    #[serde(rename = "stage.complete", alias = "stageComplete", default, skip_serializing_if = "Option::is_none")]
    pub stage_complete: Option<MessageText>,
    #[serde(rename = "stage.failed", alias = "stageFailed", default, skip_serializing_if = "Option::is_none")]
    pub stage_failed: Option<MessageText>,
    #[serde(rename = "stage.starting", alias = "stageStarting", default, skip_serializing_if = "Option::is_none")]
    pub stage_starting: Option<MessageText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageText {
    #[serde(default, deserialize_with = "weak::string")]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_options_serialize_to_nothing() {
        let options: StageOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({}));
    }

    #[test]
    fn test_execution_window_coerces_strings() {
        let options: StageOptions = serde_json::from_value(json!({
            "restrictExecutionDuringTimeWindow": "true",
            "restrictedExecutionWindow": {
                "days": ["2", 3],
                "whitelist": [{"startHour": "9", "startMin": 0, "endHour": 17, "endMin": "30"}]
            }
        }))
        .unwrap();

        assert!(options.restrict_execution_during_time_window);
        let window = options.restricted_execution_window.unwrap();
        assert_eq!(window.days, vec![2, 3]);
        assert_eq!(window.whitelist[0].start_hour, 9);
        assert_eq!(window.whitelist[0].end_min, 30);
    }

    #[test]
    fn test_notification_message_keys() {
        let notification: Notification = serde_json::from_value(json!({
            "address": "#deploys",
            "type": "slack",
            "when": "stage.failed",
            "message": {"stageFailed": {"text": "deploy failed"}}
        }))
        .unwrap();

        assert_eq!(notification.when, vec!["stage.failed"]);
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["message"]["stage.failed"]["text"], "deploy failed");
        assert!(value["message"].get("stageFailed").is_none());
    }

    #[test]
    fn test_stage_enabled_defaults_to_expression() {
        let enabled: StageEnabled =
            serde_json::from_value(json!({"expression": "${ trigger.dryRun == false }"})).unwrap();
        assert_eq!(enabled.kind, "expression");
    }
}

//! Result of evaluating one pattern string

use crate::types::{Pattern, TriggerEvent};
use chrono::{DateTime, Utc};

/// Outcome of one evaluation, built once and never mutated
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationResult {
    pub success: bool,
    pub pattern: Option<Pattern>,
    pub events: Vec<TriggerEvent>,
    /// Human-readable summary
    pub message: String,
    /// Present only when `success` is false
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl EvaluationResult {
    /// Successful evaluation of `pattern` into `events`
    pub fn success(pattern: Pattern, events: Vec<TriggerEvent>) -> Self {
        let message = format!(
            "Successfully evaluated pattern '{}' with {} events",
            pattern.name,
            events.len()
        );
        Self {
            success: true,
            pattern: Some(pattern),
            events,
            message,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Failed evaluation; `error` is shown to the user as-is
    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            pattern: None,
            events: Vec::new(),
            message: "Failed to parse pattern".to_string(),
            error: Some(format!("Parse error: {}", error)),
            timestamp: Utc::now(),
        }
    }

    /// Pretty-printed JSON. Never fails: an encoding error becomes a minimal
    /// error object.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> String {
        match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(e) => {
                let error = serde_json::Value::String(format!("JSON encoding error: {}", e));
                format!(r#"{{"success": false, "error": {}}}"#, error)
            }
        }
    }
}

//! Events emitted while an agent turn runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::tokens::TokenUsage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Text produced by the model for the user.
    Text { text: String },

    /// The model asked for a tool.
    ToolCall { name: String, args: Value },

    /// A tool finished; `output` is what the model sees.
    ToolResult { name: String, output: Value },

    /// The turn failed and ends after this event.
    Error { code: String, message: String },

    /// The turn completed.
    Done { usage: TokenUsage },
}

impl AgentEvent {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether this event reports a failure, either a runtime error or a tool
    /// result that carries an `error` key or `status: "error"`.
    pub fn is_error(&self) -> bool {
        match self {
            Self::Error { .. } => true,
            Self::ToolResult { output, .. } => output_reports_error(output),
            _ => false,
        }
    }
}

/// Tool results signal failure with an `error` key or `status: "error"`.
pub fn output_reports_error(output: &Value) -> bool {
    let Some(obj) = output.as_object() else {
        return false;
    };
    obj.contains_key("error")
        || obj
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|status| status.eq_ignore_ascii_case("error"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_result_error_conventions() {
        assert!(output_reports_error(&json!({"error": "boom"})));
        assert!(output_reports_error(&json!({"status": "ERROR", "report": "x"})));
        assert!(!output_reports_error(&json!({"status": "success"})));
        assert!(!output_reports_error(&json!("error")));
    }

    #[test]
    fn error_events() {
        assert!(AgentEvent::error("LLM_ERROR", "down").is_error());
        assert!(!AgentEvent::Text { text: "hi".into() }.is_error());
        let event = AgentEvent::ToolResult {
            name: "get_weather".into(),
            output: json!({"status": "error", "report": "n/a"}),
        };
        assert!(event.is_error());
    }

    #[test]
    fn serializes_with_type_tag() {
        let value = serde_json::to_value(AgentEvent::Text { text: "hi".into() }).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "hi"}));
    }
}

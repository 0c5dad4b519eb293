pub mod traits;
pub mod ollama;
pub mod tokens;
pub mod error;
#[cfg(test)]
pub(crate) mod scripted;


use serde::{Serialize, Deserialize};
use serde_json::Value as JsonValue;
use tokens::TokenUsage;

/// Result of a text generation from an LLM.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GenerateResult {
    pub tokens: TokenUsage,
    pub generation: String,
    /// Optional structured tool calls the LLM signaled during this generation.
    /// Each entry contains the tool name and the arguments object the LLM wants
    /// the agent to pass when invoking that tool.
    #[serde(default)]
    pub tool_calls: Vec<CallInfo>,
}

impl GenerateResult {
    /// A plain text answer without tool calls.
    pub fn text(generation: impl Into<String>) -> Self {
        Self {
            generation: generation.into(),
            ..Self::default()
        }
    }
}

/// Structured information about a single tool call requested by the LLM.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CallInfo {
    pub name: String,
    #[serde(default)]
    pub args: JsonValue,
}

impl CallInfo {
    pub fn new(name: impl Into<String>, args: JsonValue) -> Self {
        Self { name: name.into(), args }
    }
}

/// Result type for LLM operations.
pub type LLMResult<T> = std::result::Result<T, error::LLMError>;

/// Extract `{"tool_calls": [{"name": .., "args": {..}}]}` from model text.
///
/// Models that do not support native tool calling are told to embed this
/// object in their answer. The whole text is tried first, then the span from
/// the first `{` to the last `}`. Entries without a string `name` are skipped
/// and a missing `args` becomes `{}`.
pub fn parse_tool_calls(generation: &str) -> Vec<CallInfo> {
    let parsed = serde_json::from_str::<JsonValue>(generation.trim()).ok().or_else(|| {
        let start = generation.find('{')?;
        let end = generation.rfind('}')?;
        if end < start {
            return None;
        }
        serde_json::from_str::<JsonValue>(&generation[start..=end]).ok()
    });

    let Some(parsed) = parsed else {
        return Vec::new();
    };
    let Some(entries) = parsed.get("tool_calls").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let name = obj.get("name").and_then(|v| v.as_str())?;
            let args = obj.get("args").cloned().unwrap_or_else(|| serde_json::json!({}));
            Some(CallInfo::new(name, args))
        })
        .collect()
}

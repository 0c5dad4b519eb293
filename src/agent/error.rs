use crate::llm::error::LLMError;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("LLM error: {0}")]
    LLMExecutionError(#[from] LLMError),

    #[error("Maximum iterations exceeded: {0}")]
    MaxIterationsExceeded(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// An error reported through the event stream.
    #[error("{code}: {message}")]
    Reported { code: String, message: String },
}

impl AgentError {
    /// Stable code carried by `AgentEvent::Error`.
    pub fn code(&self) -> &str {
        match self {
            Self::ToolNotFound(_) => "TOOL_NOT_FOUND",
            Self::LLMExecutionError(_) => "LLM_ERROR",
            Self::MaxIterationsExceeded(_) => "MAX_ITERATIONS_EXCEEDED",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::Reported { code, .. } => code,
        }
    }
}

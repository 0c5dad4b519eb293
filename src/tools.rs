pub mod traits;
pub mod error;
pub mod schema;

use crate::state::SessionId;

/// Per-invocation context handed to every tool call.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Session the current turn belongs to.
    pub session_id: SessionId,
}

impl ToolContext {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }
}

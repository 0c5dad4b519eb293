pub use crate::agent::{events::AgentEvent, traits::AgentRunner, types::Agent};
pub use crate::config::ConciergeConfig;
pub use crate::error::{Error, Result};
pub use crate::llm::traits::LLM;
pub use crate::message::Message;
pub use crate::runner::{Runner, Session};
pub use crate::state::{SessionId, SessionStateService, StateValue};
pub use crate::tools::{traits::Tool, ToolContext};
pub use crate::tool;

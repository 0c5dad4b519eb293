use crate::llm::traits::LLM;
use std::sync::Arc;
use crate::tools::traits::Tool;
use std::collections::BTreeMap;
use super::error::AgentError;
use crate::llm::tokens::TokenUsage;
use serde::{Serialize, Deserialize};

/// High-level agent that holds an LLM and a set of tools.
pub struct Agent {
    /// A short, human-friendly name for the agent instance.
    pub name: String,

    /// One-line summary of what the agent is for.
    pub description: String,

    /// The LLM implementation used to generate responses/thoughts.
    pub llm: Arc<dyn LLM>,

    /// Registered tools the agent may call by name.
    pub tools: BTreeMap<String, Arc<dyn Tool>>,

    /// Optional system prompt / instructions provided to the LLM describing
    /// the agent's role and available behaviors.
    pub system_prompt: Option<String>,

    /// Maximum LLM round-trips within one turn.
    pub max_iterations: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AgentResult {
    pub tokens: TokenUsage,
    pub generation: String,
    /// Names of the tools invoked during the turn, in call order.
    pub tools_called: Vec<String>,
}

pub type AgentExecuteResult = Result<AgentResult, AgentError>;

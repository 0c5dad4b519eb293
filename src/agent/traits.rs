use futures::stream::BoxStream;

use super::events::AgentEvent;
use super::types::AgentExecuteResult;
use crate::message::Message;
use crate::tools::ToolContext;

/// Trait describing runtime operations an agent can perform.
#[async_trait::async_trait]
pub trait AgentRunner: Send + Sync {
    /// Run one turn and stream what happens: text, tool calls, tool results,
    /// errors, and a final `Done`. `history` is the prior conversation.
    fn run_stream<'a>(
        &'a self,
        ctx: ToolContext,
        history: Vec<Message>,
        prompt: String,
    ) -> BoxStream<'a, AgentEvent>;

    /// Call the LLM with a prompt and return the final generation result.
    async fn call_llm(&self, ctx: ToolContext, prompt: &str) -> AgentExecuteResult;
}

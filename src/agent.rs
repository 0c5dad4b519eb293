use std::collections::BTreeMap;
use std::sync::Arc;
use crate::llm::traits::LLM;
use crate::llm::tokens::TokenUsage;
use crate::message::Message;
use crate::tools::{
    traits::Tool,
    schema::ToolSchema,
    ToolContext,
};
use async_stream::try_stream;
use futures::{StreamExt, stream::BoxStream};
use serde_json::json;


pub mod types;
pub mod error;
pub mod traits;
pub mod events;

use traits::AgentRunner;
use types::{Agent,AgentResult,AgentExecuteResult};
use error::AgentError;
use events::AgentEvent;


impl Agent {
    /// Create a new Agent with the provided name and LLM. Tools start empty.
    pub fn new(name: impl Into<String>, llm: Arc<dyn LLM>,max_iterations:Option<usize>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            llm,
            tools: BTreeMap::new(),
            system_prompt: None,
            max_iterations: max_iterations.unwrap_or(100) ,
        }
    }

    /// Register a tool under the given name. Replaces any existing tool with the same name. Returns &mut Self for chaining.
    pub fn register_tool(&mut self, name: Option<&str>, tool: Arc<dyn Tool>) -> &mut Self {
        // If no name is provided, use the tool's own name.
        let name = name.unwrap_or_else(|| tool.name()).to_string();
        tracing::debug!(agent = %self.name, tool = %name, "registering tool");
        self.tools.insert(name, tool);
        self
    }

    /// Set the one-line description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Change the maximum iterations for the agent's decision process.
    pub fn change_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    /// Look up a tool by name.
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Names of the registered tools, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Set or replace the agent's system prompt.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = Some(prompt.into());
    }

    // generate system prompt
    pub fn generate_system_prompt(&self) -> Vec<Message> {
        let mut msgs = Vec::new();
        if let Some(prompt) = self.system_prompt.as_ref() {
            msgs.push(Message::system(prompt.clone()));
        }
        if !self.tools.is_empty() {
        msgs.push(Message::developer(
            format!("I also provide some tools for you to choose from. If you want to call a tool, please include the following JSON format in your response: {}

            IMPORTANT: After you have completed the task by calling all necessary tools, you MUST return a final response WITHOUT any tool_calls. Simply provide a summary or confirmation message to indicate completion. Do NOT continue calling tools after the task is done.",
                json!({
                    "tool_calls": [
                        {
                            "name": "tool_name",
                            "args": {
                                "param1": "value1",
                                "param2": "value2"
                            }
                        }
                    ]
                }))
            ));
        }
        msgs
    }

    // one system message per tool schema
    pub fn generate_tools_prompt(&self) -> Result<Vec<Message>, AgentError> {
        self.tools.iter().map(|(name, tool)| -> Result<Message, AgentError> {
            let schema = ToolSchema {
                name: name.clone(),
                ..tool.schema()
            };
            Ok(Message::system(serde_json::to_string(&schema)?))
        }).collect()
    }

    /// Full request for a turn: instructions, tool schemas, history, then the user prompt.
    pub fn build_messages(&self, history: Vec<Message>, prompt: String) -> Result<Vec<Message>, AgentError> {
        let mut msgs = self.generate_system_prompt();
        msgs.extend(self.generate_tools_prompt()?);
        msgs.extend(history);
        msgs.push(Message::user(prompt));
        Ok(msgs)
    }

    /// The turn loop: call the LLM, run any requested tools, feed results back, repeat.
    /// Stops at the first answer without tool calls, or fails after `max_iterations`.
    fn try_run<'a>(
        &'a self,
        ctx: ToolContext,
        history: Vec<Message>,
        prompt: String,
    ) -> BoxStream<'a, Result<AgentEvent, AgentError>> {
        Box::pin(try_stream! {
            let mut msgs = self.build_messages(history, prompt)?;
            let mut usage = TokenUsage::default();
            let mut counter: usize = 0;
            while counter < self.max_iterations {
                let res = self.llm.generate(&msgs).await?;
                usage += res.tokens;
                counter += 1;
                if res.tool_calls.is_empty() {
                    yield AgentEvent::Text { text: res.generation };
                    yield AgentEvent::Done { usage };
                    return;
                }
                // add assistant message
                msgs.push(Message::assistant(res.generation));
                for call_info in res.tool_calls {
                    let name = call_info.name;
                    let tool_impl = self
                        .get_tool(&name)
                        .ok_or_else(|| AgentError::ToolNotFound(name.clone()))?;
                    yield AgentEvent::ToolCall { name: name.clone(), args: call_info.args.clone() };
                    let output = match tool_impl.run(&ctx, call_info.args).await {
                        Ok(output) => output,
                        Err(err) => {
                            tracing::warn!(tool = %name, error = %err, "tool execution failed");
                            json!({ "error": err.to_string() })
                        }
                    };
                    msgs.push(Message::tool_res(
                        &name,
                        format!("Tool {} returned: {}", name, output)));
                    yield AgentEvent::ToolResult { name, output };
                }
            }
            Err::<(), _>(AgentError::MaxIterationsExceeded(self.max_iterations))?;
        })
    }
}



#[async_trait::async_trait]
impl AgentRunner for Agent {
    fn run_stream<'a>(
        &'a self,
        ctx: ToolContext,
        history: Vec<Message>,
        prompt: String,
    ) -> BoxStream<'a, AgentEvent> {
        self.try_run(ctx, history, prompt)
            .map(|item| item.unwrap_or_else(|err| {
                tracing::warn!(code = err.code(), error = %err, "agent turn failed");
                AgentEvent::error(err.code(), err.to_string())
            }))
            .boxed()
    }

    async fn call_llm(&self, ctx: ToolContext, prompt: &str) -> AgentExecuteResult {
        let mut result = AgentResult::default();
        let mut events = self.try_run(ctx, Vec::new(), prompt.to_string());
        while let Some(event) = events.next().await {
            match event? {
                AgentEvent::Text { text } => result.generation = text,
                AgentEvent::ToolCall { name, .. } => result.tools_called.push(name),
                AgentEvent::Done { usage } => result.tokens = usage,
                AgentEvent::Error { code, message } => {
                    return Err(AgentError::Reported { code, message });
                }
                AgentEvent::ToolResult { .. } => {}
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerateResult, scripted::{ScriptedLlm, call}};
    use crate::message::MessageRole;
    use crate::tool;
    use serde_json::json;

    #[tool(description = "Echo the input", params(text = "Text to echo"))]
    fn echo(text: String) -> String {
        text
    }

    fn ctx() -> ToolContext {
        ToolContext::new("agent-test".into())
    }

    fn agent_with(llm: Arc<ScriptedLlm>, max_iterations: usize) -> Agent {
        let mut agent = Agent::new("test", llm, Some(max_iterations));
        agent.set_system_prompt("be brief");
        agent.register_tool(None, Arc::new(EchoTool));
        agent
    }

    async fn collect(agent: &Agent, prompt: &str) -> Vec<AgentEvent> {
        agent.run_stream(ctx(), Vec::new(), prompt.to_string()).collect().await
    }

    #[tokio::test]
    async fn plain_answer_ends_the_turn() {
        let llm = Arc::new(ScriptedLlm::new([GenerateResult::text("hello")]));
        let agent = agent_with(llm.clone(), 3);
        let events = collect(&agent, "hi").await;
        assert_eq!(events[0], AgentEvent::Text { text: "hello".into() });
        assert!(matches!(events[1], AgentEvent::Done { .. }));
        assert_eq!(events.len(), 2);

        let request = &llm.requests()[0];
        assert_eq!(request[0], Message::system("be brief"));
        assert_eq!(request[1].role, MessageRole::Developer);
        assert!(request[2].content.contains("\"echo\""));
        assert_eq!(request.last(), Some(&Message::user("hi")));
    }

    #[tokio::test]
    async fn tool_results_are_fed_back() {
        let llm = Arc::new(ScriptedLlm::new([
            call("echo", json!({"text": "ping"})),
            GenerateResult::text("pong"),
        ]));
        let agent = agent_with(llm.clone(), 3);
        let events = collect(&agent, "go").await;
        assert_eq!(
            events[..3],
            [
                AgentEvent::ToolCall { name: "echo".into(), args: json!({"text": "ping"}) },
                AgentEvent::ToolResult { name: "echo".into(), output: json!("ping") },
                AgentEvent::Text { text: "pong".into() },
            ]
        );

        let second = &llm.requests()[1];
        let tool_msg = second.last().unwrap();
        assert_eq!(tool_msg.role, MessageRole::ToolResponse);
        assert_eq!(tool_msg.content, "Tool echo returned: \"ping\"");
    }

    #[tokio::test]
    async fn bad_arguments_become_error_results() {
        let llm = Arc::new(ScriptedLlm::new([
            call("echo", json!({"wrong": 1})),
            GenerateResult::text("sorry"),
        ]));
        let agent = agent_with(llm, 3);
        let events = collect(&agent, "go").await;
        let AgentEvent::ToolResult { output, .. } = &events[1] else {
            panic!("expected a tool result, got {:?}", events[1]);
        };
        assert!(output.get("error").is_some());
        assert_eq!(events[2], AgentEvent::Text { text: "sorry".into() });
    }

    #[tokio::test]
    async fn unknown_tool_ends_with_error() {
        let llm = Arc::new(ScriptedLlm::new([call("teleport", json!({}))]));
        let agent = agent_with(llm, 3);
        let events = collect(&agent, "go").await;
        assert_eq!(events.len(), 1);
        let AgentEvent::Error { code, .. } = &events[0] else {
            panic!("expected an error event");
        };
        assert_eq!(code, "TOOL_NOT_FOUND");
    }

    #[tokio::test]
    async fn iteration_cap() {
        let llm = Arc::new(ScriptedLlm::new([
            call("echo", json!({"text": "1"})),
            call("echo", json!({"text": "2"})),
        ]));
        let agent = agent_with(llm, 2);
        let err = agent.call_llm(ctx(), "loop").await.unwrap_err();
        assert_eq!(err.code(), "MAX_ITERATIONS_EXCEEDED");
    }

    #[tokio::test]
    async fn call_llm_collects_the_turn() {
        let llm = Arc::new(ScriptedLlm::new([
            call("echo", json!({"text": "x"})),
            GenerateResult {
                tokens: TokenUsage::new(5, 2),
                ..GenerateResult::text("done")
            },
        ]));
        let agent = agent_with(llm, 5);
        let result = agent.call_llm(ctx(), "go").await.unwrap();
        assert_eq!(result.generation, "done");
        assert_eq!(result.tools_called, vec!["echo".to_string()]);
        assert_eq!(result.tokens.total_tokens, 7);
    }

    #[tokio::test]
    async fn llm_failures_surface_as_error_events() {
        let agent = agent_with(Arc::new(ScriptedLlm::default()), 3);
        let events = collect(&agent, "go").await;
        assert!(matches!(&events[..], [AgentEvent::Error { code, .. }] if code == "LLM_ERROR"));
    }
}

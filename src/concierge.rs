//! Wires the travel concierge together: instruction prompt, the five tools,
//! the shared session state and the bootstrap that seeds new sessions.

use std::path::Path;
use std::sync::Arc;

use crate::agent::types::Agent;
use crate::city::{GetCurrentTimeTool, GetWeatherTool};
use crate::config::ConciergeConfig;
use crate::error::Result;
use crate::llm::traits::LLM;
use crate::memory::{MemoryBootstrap, MemoryTool, MemoryTools, ProfileLoader};
use crate::runner::{Runner, Session};
use crate::state::SessionStateService;

pub const DESCRIPTION: &str = "Agent to answer questions about the time and weather in a city.";

/// Used when the instruction file cannot be read.
pub const FALLBACK_INSTRUCTION: &str =
    "You are a helpful agent who can answer user questions about the time and weather in a city.";

const BUNDLED_INSTRUCTION: &str = include_str!("../prompts/travel_concierge_agent.txt");

/// Instruction prompt: the file at `path` if given, else the bundled prompt.
pub fn load_instruction(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return BUNDLED_INSTRUCTION.trim().to_string();
    };
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let instruction = text.trim().to_string();
            tracing::debug!(path = %path.display(), length = instruction.len(), "loaded instruction");
            instruction
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to load instruction prompt, using fallback"
            );
            FALLBACK_INSTRUCTION.to_string()
        }
    }
}

/// Build the concierge agent over `llm` with all tools registered.
pub fn build_agent(config: &ConciergeConfig, llm: Arc<dyn LLM>, state: Arc<SessionStateService>) -> Agent {
    tracing::info!(model = %config.model, name = %config.app_name, "initializing travel concierge agent");
    let mut agent = Agent::new(config.app_name.clone(), llm, Some(config.max_iterations));
    agent.set_description(DESCRIPTION);
    agent.set_system_prompt(load_instruction(config.instruction_path.as_deref()));
    agent
        .register_tool(None, Arc::new(GetCurrentTimeTool))
        .register_tool(None, Arc::new(GetWeatherTool));
    for tool in MemoryTool::all(MemoryTools::new(state)) {
        agent.register_tool(None, tool);
    }
    tracing::info!(tools = ?agent.tool_names(), "travel concierge agent initialized");
    agent
}

/// The assembled application.
pub struct Concierge {
    config: ConciergeConfig,
    state: Arc<SessionStateService>,
    runner: Runner,
    bootstrap: MemoryBootstrap,
}

impl Concierge {
    /// Assemble everything over an explicit LLM.
    pub fn new(config: ConciergeConfig, llm: Arc<dyn LLM>) -> Result<Self> {
        config.validate()?;
        let state = Arc::new(SessionStateService::new());
        let agent = build_agent(&config, llm, Arc::clone(&state));
        let runner = Runner::new(config.app_name.clone(), Arc::new(agent));
        let loader = ProfileLoader::bundled().with_override_path(config.scenario_path.clone());
        let bootstrap = MemoryBootstrap::new(Arc::clone(&state), loader);
        Ok(Self {
            config,
            state,
            runner,
            bootstrap,
        })
    }

    pub fn config(&self) -> &ConciergeConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<SessionStateService> {
        &self.state
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Create a session for the configured user and seed its memory.
    pub fn start_session(&self) -> Session {
        let session = self.runner.create_session(self.config.user_id.clone());
        self.bootstrap.bootstrap(session.id());
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::events::AgentEvent;
    use crate::error::Error;
    use crate::llm::{GenerateResult, scripted::{ScriptedLlm, call}};
    use crate::state::{StateValue, keys::ITIN_INITIALIZED};
    use futures::StreamExt;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn registers_all_tools() {
        let agent = build_agent(
            &ConciergeConfig::default(),
            Arc::new(ScriptedLlm::default()),
            Arc::new(SessionStateService::new()),
        );
        assert_eq!(
            agent.tool_names(),
            vec!["forget", "get_current_time", "get_weather", "memorize", "memorize_list"]
        );
        assert_eq!(agent.description, DESCRIPTION);
        assert!(agent.system_prompt.as_deref().unwrap().contains("travel concierge"));
    }

    #[test]
    fn instruction_override_and_fallback() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prompt.txt");
        std::fs::write(&path, "  Be a pirate.\n").unwrap();
        assert_eq!(load_instruction(Some(&path)), "Be a pirate.");
        assert_eq!(
            load_instruction(Some(&tmp.path().join("missing.txt"))),
            FALLBACK_INSTRUCTION
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ConciergeConfig {
            model: String::new(),
            ..ConciergeConfig::default()
        };
        let err = Concierge::new(config, Arc::new(ScriptedLlm::default())).err();
        assert!(matches!(err, Some(Error::Config(_))));
    }

    #[tokio::test]
    async fn started_sessions_are_bootstrapped_and_remember() {
        let llm = Arc::new(ScriptedLlm::new([
            call("memorize_list", json!({"key": "likes", "value": "jazz"})),
            GenerateResult::text("Noted!"),
        ]));
        let concierge = Concierge::new(ConciergeConfig::default(), llm).unwrap();
        let session = concierge.start_session();
        assert_eq!(
            concierge.state().get(session.id(), ITIN_INITIALIZED),
            Some(StateValue::Bool(true))
        );

        let events: Vec<_> = concierge
            .runner()
            .run(session.id(), "I love jazz")
            .collect()
            .await;
        assert!(events.iter().any(|e| matches!(e, AgentEvent::ToolCall { name, .. } if name == "memorize_list")));
        assert_eq!(
            concierge.state().get(session.id(), "likes"),
            Some(StateValue::List(vec!["jazz".to_string()]))
        );
    }
}

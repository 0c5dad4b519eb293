//! Deterministic `LLM` double for agent, runner and command loop tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use futures::{FutureExt, future::BoxFuture};

use crate::llm::{error::LLMError, traits::LLM, CallInfo, GenerateResult, LLMResult};
use crate::message::Message;

/// Replays queued responses in order and records every request it receives.
/// An exhausted script answers with `LLMError::InvalidResponse`.
#[derive(Default)]
pub(crate) struct ScriptedLlm {
    responses: Mutex<VecDeque<GenerateResult>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLlm {
    pub(crate) fn new(responses: impl IntoIterator<Item = GenerateResult>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

/// A generation that asks for one tool call.
pub(crate) fn call(name: &str, args: serde_json::Value) -> GenerateResult {
    GenerateResult {
        generation: format!("calling {name}"),
        tool_calls: vec![CallInfo::new(name, args)],
        ..GenerateResult::default()
    }
}

impl LLM for ScriptedLlm {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> BoxFuture<'a, LLMResult<GenerateResult>> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let next = self.responses.lock().unwrap().pop_front();
        async move { next.ok_or_else(|| LLMError::InvalidResponse("script exhausted".to_string())) }
            .boxed()
    }
}

//! In-memory session service driving an [`Agent`] turn by turn.
//!
//! Each session keeps its own conversation history. A turn streams
//! [`AgentEvent`]s; once the stream completes, the user line and the agent's
//! final text are appended to the history. History is cloned out before the
//! turn starts so no map guard is held across an await.

use std::sync::Arc;

use async_stream::stream;
use dashmap::DashMap;
use futures::{StreamExt, stream::BoxStream};

use crate::agent::{
    error::AgentError,
    events::AgentEvent,
    traits::AgentRunner,
    types::Agent,
};
use crate::message::Message;
use crate::state::SessionId;
use crate::tools::ToolContext;

/// A conversation handle issued by [`Runner::create_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    app_name: String,
    user_id: String,
}

impl Session {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

pub struct Runner {
    app_name: String,
    agent: Arc<Agent>,
    sessions: DashMap<SessionId, Session>,
    history: DashMap<SessionId, Vec<Message>>,
}

impl Runner {
    pub fn new(app_name: impl Into<String>, agent: Arc<Agent>) -> Self {
        Self {
            app_name: app_name.into(),
            agent,
            sessions: DashMap::new(),
            history: DashMap::new(),
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Open a new session for `user_id`.
    pub fn create_session(&self, user_id: impl Into<String>) -> Session {
        let session = Session {
            id: SessionId::new(),
            app_name: self.app_name.clone(),
            user_id: user_id.into(),
        };
        self.history.insert(session.id.clone(), Vec::new());
        self.sessions.insert(session.id.clone(), session.clone());
        tracing::info!(app = %self.app_name, user = %session.user_id, session = %session.id, "session created");
        session
    }

    pub fn get_session(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions.get(session_id.as_str()).map(|s| s.value().clone())
    }

    /// Conversation so far, oldest first.
    pub fn history(&self, session_id: &SessionId) -> Option<Vec<Message>> {
        self.history.get(session_id.as_str()).map(|h| h.value().clone())
    }

    /// Forward one user message and stream the agent's events.
    pub fn run<'a>(&'a self, session_id: &SessionId, text: &str) -> BoxStream<'a, AgentEvent> {
        let session_id = session_id.clone();
        let text = text.to_string();
        Box::pin(stream! {
            let Some(history) = self.history(&session_id) else {
                let err = AgentError::SessionNotFound(session_id.to_string());
                tracing::warn!(error = %err, "turn for unknown session");
                yield AgentEvent::error(err.code(), err.to_string());
                return;
            };

            tracing::debug!(session = %session_id, length = text.len(), "dispatching user input");
            let ctx = ToolContext::new(session_id.clone());
            let mut events = self.agent.run_stream(ctx, history, text.clone());
            let mut reply = None;
            while let Some(event) = events.next().await {
                if let AgentEvent::Text { text } = &event {
                    reply = Some(text.clone());
                }
                yield event;
            }

            if let Some(mut history) = self.history.get_mut(session_id.as_str()) {
                history.push(Message::user(text));
                if let Some(reply) = reply {
                    history.push(Message::assistant(reply));
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerateResult, scripted::ScriptedLlm};

    fn runner(responses: Vec<GenerateResult>) -> (Arc<ScriptedLlm>, Runner) {
        let llm = Arc::new(ScriptedLlm::new(responses));
        let agent = Agent::new("test", llm.clone(), Some(3));
        (llm, Runner::new("app", Arc::new(agent)))
    }

    #[test]
    fn sessions_have_unique_ids() {
        let (_, runner) = runner(Vec::new());
        let a = runner.create_session("student");
        let b = runner.create_session("student");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.app_name(), "app");
        assert_eq!(runner.get_session(a.id()), Some(a.clone()));
        assert_eq!(runner.history(a.id()), Some(Vec::new()));
    }

    #[tokio::test]
    async fn turns_extend_the_history() {
        let (llm, runner) = runner(vec![
            GenerateResult::text("Hi there"),
            GenerateResult::text("Still here"),
        ]);
        let session = runner.create_session("student");

        let events: Vec<_> = runner.run(session.id(), "hello").collect().await;
        assert_eq!(events[0], AgentEvent::Text { text: "Hi there".into() });
        let _: Vec<_> = runner.run(session.id(), "again").collect().await;

        assert_eq!(
            runner.history(session.id()).unwrap(),
            vec![
                Message::user("hello"),
                Message::assistant("Hi there"),
                Message::user("again"),
                Message::assistant("Still here"),
            ]
        );
        // second request replays the first exchange before the new prompt
        let second = &llm.requests()[1];
        assert_eq!(second[second.len() - 3], Message::user("hello"));
        assert_eq!(second.last(), Some(&Message::user("again")));
    }

    #[tokio::test]
    async fn unknown_session_yields_an_error() {
        let (_, runner) = runner(Vec::new());
        let events: Vec<_> = runner.run(&SessionId::from("nope"), "hello").collect().await;
        assert!(matches!(&events[..], [AgentEvent::Error { code, .. }] if code == "SESSION_NOT_FOUND"));
    }
}

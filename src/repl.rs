//! Line-oriented command loop: read a line, run a turn, print the replies.

use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::agent::events::AgentEvent;
use crate::runner::Runner;
use crate::state::SessionId;

pub const USER_PROMPT: &str = "\nYou > ";
pub const AGENT_PROMPT: &str = "\nAgent > ";

/// What happened during one turn, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    pub tool_called: bool,
    pub errored: bool,
}

/// Run until end of input or `quit` (any case). Blank lines are skipped.
/// Only I/O errors on `input`/`output` end the loop with an error.
pub async fn run<R, W>(
    runner: &Runner,
    session_id: &SessionId,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(USER_PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            tracing::info!("end of input, exiting");
            break;
        };
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") {
            tracing::info!("user requested to quit");
            break;
        }
        if trimmed.is_empty() {
            tracing::debug!("ignoring empty user input");
            continue;
        }

        output.write_all(AGENT_PROMPT.as_bytes()).await?;
        let outcome = run_turn(runner, session_id, &line, &mut output).await?;
        if outcome.tool_called && !outcome.errored {
            tracing::debug!("a tool was used successfully in this turn");
        }
        if outcome.errored {
            tracing::warn!("an error occurred during tool execution or in the agent's response processing");
        }
    }
    output.flush().await
}

/// Send one line to the agent and print each text segment on its own line.
pub async fn run_turn<W>(
    runner: &Runner,
    session_id: &SessionId,
    line: &str,
    output: &mut W,
) -> std::io::Result<TurnOutcome>
where
    W: AsyncWrite + Unpin,
{
    let mut outcome = TurnOutcome::default();
    let mut events = runner.run(session_id, line);
    while let Some(event) = events.next().await {
        if event.is_error() {
            outcome.errored = true;
        }
        match event {
            AgentEvent::Text { text } => {
                output.write_all(text.as_bytes()).await?;
                output.write_all(b"\n").await?;
                output.flush().await?;
            }
            AgentEvent::ToolCall { .. } => outcome.tool_called = true,
            AgentEvent::Error { code, message } => {
                tracing::warn!(%code, %message, "agent event contained an error");
            }
            AgentEvent::ToolResult { .. } | AgentEvent::Done { .. } => {}
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::agent::types::Agent;
    use crate::city::GetWeatherTool;
    use crate::llm::{GenerateResult, scripted::{ScriptedLlm, call}};
    use serde_json::json;
    use tokio::io::BufReader;

    fn runner(responses: Vec<GenerateResult>) -> (Arc<ScriptedLlm>, Runner) {
        let llm = Arc::new(ScriptedLlm::new(responses));
        let mut agent = Agent::new("repl", llm.clone(), Some(4));
        agent.register_tool(None, Arc::new(GetWeatherTool));
        (llm, Runner::new("app", Arc::new(agent)))
    }

    #[tokio::test]
    async fn prints_replies_and_stops_on_quit() {
        let (llm, runner) = runner(vec![GenerateResult::text("Hello!")]);
        let session = runner.create_session("student");
        let input = tokio_test::io::Builder::new()
            .read(b"hi\n\n   \nQUIT\nnever read\n")
            .build();
        let mut output = Vec::new();

        run(&runner, session.id(), BufReader::new(input), &mut output)
            .await
            .unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert_eq!(
            printed,
            format!("{USER_PROMPT}{AGENT_PROMPT}Hello!\n{USER_PROMPT}{USER_PROMPT}{USER_PROMPT}")
        );
        assert_eq!(llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn end_of_input_ends_the_loop() {
        let (llm, runner) = runner(Vec::new());
        let session = runner.create_session("student");
        let input = tokio_test::io::Builder::new().build();
        let mut output = Vec::new();
        run(&runner, session.id(), BufReader::new(input), &mut output)
            .await
            .unwrap();
        assert_eq!(output, USER_PROMPT.as_bytes());
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn turn_tracks_tool_use_and_errors() {
        let (_, runner) = runner(vec![
            call("get_weather", json!({"city": "New York"})),
            GenerateResult::text("Sunny."),
            call("get_weather", json!({"city": "Paris"})),
            GenerateResult::text("No data."),
        ]);
        let session = runner.create_session("student");
        let mut output = Vec::new();

        let ok = run_turn(&runner, session.id(), "weather in NY?", &mut output).await.unwrap();
        assert_eq!(ok, TurnOutcome { tool_called: true, errored: false });

        let failed = run_turn(&runner, session.id(), "and Paris?", &mut output).await.unwrap();
        assert_eq!(failed, TurnOutcome { tool_called: true, errored: true });

        assert_eq!(String::from_utf8(output).unwrap(), "Sunny.\nNo data.\n");
    }

    #[tokio::test]
    async fn runtime_errors_mark_the_turn() {
        let (_, runner) = runner(Vec::new());
        let session = runner.create_session("student");
        let mut output = Vec::new();
        let outcome = run_turn(&runner, session.id(), "hello", &mut output).await.unwrap();
        assert_eq!(outcome, TurnOutcome { tool_called: false, errored: true });
        assert!(output.is_empty());
    }
}

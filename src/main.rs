//! Interactive travel concierge.
//!
//! ```bash
//! RUST_LOG=travel_concierge=debug cargo run
//! ```
//!
//! Requires a local Ollama server. `TRAVEL_CONCIERGE_CONFIG` names an optional
//! TOML config file, `TRAVEL_CONCIERGE_SCENARIO` a profile document.

use anyhow::Context;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use travel_concierge::concierge::Concierge;
use travel_concierge::config::ConciergeConfig;
use travel_concierge::llm::{ollama::Ollama, traits::llm_to_arc_dyn};
use travel_concierge::repl;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ConciergeConfig::from_env().context("loading configuration")?;
    let llm = llm_to_arc_dyn(Ollama::from_config(&config));
    let concierge = Concierge::new(config, llm)?;
    let session = concierge.start_session();

    let stdin = BufReader::new(tokio::io::stdin());
    repl::run(concierge.runner(), session.id(), stdin, tokio::io::stdout())
        .await
        .context("reading from stdin")?;
    Ok(())
}

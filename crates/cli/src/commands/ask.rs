//! `billwise ask`: answer one question and print it.

use std::path::Path;

use anyhow::Context;
use billwise_agent::AgentHandle;
use billwise_config::AppConfig;

use crate::AskArgs;

/// Asked when no question is given on the command line.
pub const DEFAULT_QUERY: &str = "What bills are about healthcare in 2026?";

pub fn query_text(words: &[String]) -> String {
    let joined = words.join(" ");
    if joined.trim().is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        joined
    }
}

pub async fn run(config_path: &Path, args: AskArgs) -> anyhow::Result<()> {
    let config = AppConfig::load_with_env(config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    if billwise_providers::missing_api_key(&config) {
        eprintln!("No API key configured for backend '{}'.", config.default_provider);
        eprintln!("Set BILLWISE_API_KEY or OPENAI_API_KEY, or add api_key to:");
        eprintln!("  {}", config_path.display());
    }

    let mut agent = AgentHandle::from_config(&config).context("failed to build the agent")?;
    if let Some(max_turns) = args.max_turns {
        agent = agent.with_max_turns(max_turns);
    }

    let query = query_text(&args.query);
    println!("Query: {query}");

    let outcome = match agent.ask_detailed(&query).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(transcript) = e.transcript() {
                tracing::debug!(messages = transcript.len(), "Partial transcript at failure");
                if args.show_transcript {
                    println!("{}", serde_json::to_string_pretty(transcript)?);
                }
            }
            return Err(e).context("query failed");
        }
    };

    println!("Response: {}", outcome.answer);
    if args.show_transcript {
        println!("{}", serde_json::to_string_pretty(&outcome.transcript)?);
    }
    Ok(())
}

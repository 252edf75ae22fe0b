//! billwise CLI: the main entry point.
//!
//! Commands:
//! - `ask`    : Answer a question about Missouri House bills (default)
//! - `onboard`: Write a starter config file
//! - `doctor` : Check config, credentials and bill data

use std::path::PathBuf;

use billwise_config::AppConfig;
use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "billwise",
    about = "Ask questions about Missouri House bills",
    version,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    ask: AskArgs,

    /// Config file (defaults to ~/.billwise/config.toml)
    #[arg(short, long, global = true, env = "BILLWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Args, Debug, Default, Clone)]
struct AskArgs {
    /// The question; words are joined with spaces
    query: Vec<String>,

    /// Override agent.max_turns for this query
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_turns: Option<u32>,

    /// Print the full transcript as JSON after the response
    #[arg(long)]
    show_transcript: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question (the default when no command is given)
    Ask(AskArgs),

    /// Write a default config file
    Onboard {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Diagnose configuration and data problems
    Doctor,
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    // stdout carries only the answer
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);

    match cli.command {
        None => commands::ask::run(&config_path, cli.ask).await,
        Some(Commands::Ask(args)) => commands::ask::run(&config_path, args).await,
        Some(Commands::Onboard { force }) => commands::onboard::run(&config_path, force),
        Some(Commands::Doctor) => commands::doctor::run(&config_path),
    }
}

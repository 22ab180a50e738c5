//! NIA chat companion entry point.
//!
//! Binary name: `nia`
//!
//! Parses CLI arguments, initializes tracing, storage and the chat endpoint,
//! then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;

use nia_observe::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = TracingOptions {
        default_filter: cli::log_filter(cli.verbose, cli.quiet).to_string(),
        json: cli.log_json,
        otel: cli.otel,
    };
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init(cli.ephemeral).await?;

    match cli.command {
        Commands::Chat => cli::chat::loop_runner::run_chat_loop(&state).await,
        Commands::History => cli::history::show_history(&state, cli.json).await,
        Commands::Clear => cli::history::clear_history(&state, cli.json).await,
        Commands::Suggestions => cli::history::show_suggestions(&state, cli.json),
    }
}

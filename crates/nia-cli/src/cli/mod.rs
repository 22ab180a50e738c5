//! CLI command definitions for the `nia` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod history;

use clap::{Parser, Subcommand};

/// Talk with NIA, a wellbeing companion.
#[derive(Parser)]
#[command(name = "nia", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed logs (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true, env = "NIA_OTEL")]
    pub otel: bool,

    /// Keep the transcript in memory only; nothing is written to disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session.
    Chat,

    /// Print the stored conversation.
    #[command(alias = "log")]
    History,

    /// Erase the stored conversation.
    #[command(alias = "reset")]
    Clear,

    /// List the conversation starters.
    Suggestions,
}

/// Default log filter for the given verbosity flags. `RUST_LOG` overrides it.
pub fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,nia_core=debug,nia_infra=debug",
        _ => "trace",
    }
}

//! Main chat loop orchestration.
//!
//! Reads user lines, dispatches slash commands, and drives one turn at a
//! time through the session manager while rendering its transcript events.

use std::io::Write;

use console::style;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use nia_types::event::TranscriptEvent;

use crate::cli::history::print_suggestions;
use crate::state::{AppState, ConcreteChatManager};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{ChatRenderer, print_message, thinking_spinner};

/// Run the interactive chat loop until `/exit` or end of input.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let manager = &state.manager;

    print_welcome_banner(&state.config.model, state.storage, state.has_api_key);

    if manager.has_history().await {
        let transcript = manager.transcript().await;
        if let Some(last) = transcript.iter().skip(1).last() {
            println!("  {}", style("Continuing where you left off:").dim());
            print_message(last);
        }
    } else {
        print_suggestions(manager.suggestions());
        println!();
    }

    let mut input = ChatInput::new();

    loop {
        print!("  {} ", style("Tú >").green().bold());
        let _ = std::io::stdout().flush();

        let text = match input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D or type /exit to leave.").dim());
                continue;
            }
            InputEvent::Message(text) => text,
        };
        if text.is_empty() {
            continue;
        }

        let text = match commands::parse(&text) {
            None => text,
            Some(ChatCommand::Help) => {
                commands::print_help();
                continue;
            }
            Some(ChatCommand::Clear) => {
                match manager.clear().await {
                    Ok(()) => println!("\n  {} Conversation cleared.\n", style("✓").green().bold()),
                    Err(e) => println!("\n  {} {}\n", style("!").red().bold(), e.user_message()),
                }
                print_suggestions(manager.suggestions());
                println!();
                continue;
            }
            Some(ChatCommand::Suggestions) => {
                println!();
                print_suggestions(manager.suggestions());
                println!();
                continue;
            }
            Some(ChatCommand::Suggestion(n)) => match n.checked_sub(1).and_then(|i| manager.suggestions().get(i)) {
                Some(suggestion) => {
                    println!("  {} {}", style("Tú >").green().bold(), suggestion);
                    suggestion.clone()
                }
                None => {
                    println!(
                        "\n  {} No suggestion #{n}. Type /suggestions to list them.\n",
                        style("?").yellow().bold()
                    );
                    continue;
                }
            },
            Some(ChatCommand::History) => {
                println!();
                for message in manager.transcript().await.iter().skip(1) {
                    print_message(message);
                }
                continue;
            }
            Some(ChatCommand::Exit) => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            Some(ChatCommand::Unknown(name)) => {
                println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                );
                continue;
            }
        };

        stream_reply(manager, &text).await;
    }

    Ok(())
}

/// Run one turn, printing deltas as they are applied. Ctrl+C stops the reply.
async fn stream_reply(manager: &ConcreteChatManager, text: &str) {
    let mut events = manager.subscribe();
    let spinner = thinking_spinner();
    let mut renderer = ChatRenderer::new();

    let turn = manager.run_turn(text);
    tokio::pin!(turn);

    let result = loop {
        tokio::select! {
            biased;

            event = events.recv() => match event {
                Ok(TranscriptEvent::DeltaApplied { text, .. }) => {
                    if !renderer.started() {
                        spinner.finish_and_clear();
                    }
                    renderer.print_streaming_token(&text);
                }
                Ok(TranscriptEvent::LastReplaced { content }) => {
                    spinner.finish_and_clear();
                    renderer.print_streaming_token(&style(content).dim().to_string());
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Renderer fell behind the transcript");
                }
                Err(RecvError::Closed) => {}
            },

            _ = tokio::signal::ctrl_c() => {
                debug!("Ctrl+C during reply");
                manager.cancel();
            }

            result = &mut turn => break result,
        }
    };

    spinner.finish_and_clear();
    match result {
        Ok(summary) => renderer.print_stats_footer(&summary),
        Err(err) => renderer.print_turn_error(&err),
    }
}

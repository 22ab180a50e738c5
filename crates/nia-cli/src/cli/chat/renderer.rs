//! Terminal output for streamed replies.
//!
//! Tokens are printed raw as they arrive, with continuation lines indented
//! under the speaker label.

use std::io::Write;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use nia_core::chat::manager::TurnSummary;
use nia_types::chat::{ChatRole, Message};
use nia_types::error::ChatError;

const INDENT: &str = "  ";

/// Prints one streamed reply.
#[derive(Default)]
pub struct ChatRenderer {
    started: bool,
}

impl ChatRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether anything of the reply has been printed.
    pub fn started(&self) -> bool {
        self.started
    }

    /// Print a single streaming token, printing the label first if needed.
    pub fn print_streaming_token(&mut self, token: &str) {
        if !self.started {
            self.started = true;
            print!("\n{INDENT}{} ", style("NIA").magenta().bold());
        }
        print!("{}", indent_continuations(token));
        let _ = std::io::stdout().flush();
    }

    /// Print the reply footer for a completed turn.
    pub fn print_stats_footer(&self, summary: &TurnSummary) {
        println!();
        println!(
            "{INDENT}{}",
            style(format!(
                "{} chars · {:.1}s",
                summary.chars,
                summary.elapsed_ms as f64 / 1000.0
            ))
            .dim()
        );
        println!();
    }

    /// Close the reply and print the user-facing reason the turn ended early.
    pub fn print_turn_error(&self, err: &ChatError) {
        if self.started {
            println!();
        }
        let marker = if err.is_fault() {
            style("!").red().bold()
        } else {
            style("■").yellow().bold()
        };
        println!("\n{INDENT}{marker} {}", err.user_message());
        println!();
    }
}

/// Spinner shown until the first delta arrives.
pub fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::default_spinner()
        .template("  {spinner:.magenta} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(spinner_style);
    spinner.set_message("pensando...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Print one stored message with its speaker label.
pub fn print_message(message: &Message) {
    let label = match message.role {
        ChatRole::User => style("Tú").green().bold(),
        ChatRole::Model => style("NIA").magenta().bold(),
        ChatRole::System => style("System").dim(),
    };
    println!("{INDENT}{label} {}", indent_continuations(&message.content));
    println!();
}

fn indent_continuations(text: &str) -> String {
    text.replace('\n', &format!("\n{INDENT}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_continuations() {
        assert_eq!(indent_continuations("uno\ndos"), "uno\n  dos");
        assert_eq!(indent_continuations("sin saltos"), "sin saltos");
    }

    #[test]
    fn test_renderer_tracks_first_token() {
        let mut renderer = ChatRenderer::new();
        assert!(!renderer.started());
        renderer.print_streaming_token("Hola");
        assert!(renderer.started());
    }
}

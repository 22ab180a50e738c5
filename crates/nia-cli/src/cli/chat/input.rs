//! Line input for the chat loop.
//!
//! Reads stdin line by line. Ctrl+C at the prompt is reported as
//! `Interrupted` instead of killing the process, since the loop installs its
//! own Ctrl+C handling to stop replies.

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Events produced by the input handler.
#[derive(Debug)]
pub enum InputEvent {
    /// User submitted a line (trimmed).
    Message(String),
    /// End of input (Ctrl+D).
    Eof,
    /// Interrupt signal (Ctrl+C).
    Interrupted,
}

pub struct ChatInput {
    lines: Lines<BufReader<Stdin>>,
}

impl ChatInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Wait for the next line or Ctrl+C.
    pub async fn read_line(&mut self) -> InputEvent {
        tokio::select! {
            line = self.lines.next_line() => match line {
                Ok(Some(line)) => InputEvent::Message(line.trim().to_string()),
                Ok(None) | Err(_) => InputEvent::Eof,
            },
            _ = tokio::signal::ctrl_c() => InputEvent::Interrupted,
        }
    }
}

impl Default for ChatInput {
    fn default() -> Self {
        Self::new()
    }
}

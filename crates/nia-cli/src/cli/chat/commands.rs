//! Slash command parsing for the chat loop.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Erase the conversation and start over.
    Clear,
    /// List the conversation starters.
    Suggestions,
    /// Send conversation starter number N (1-based).
    Suggestion(usize),
    /// Show the conversation so far.
    History,
    /// Exit the chat session.
    Exit,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    let name = trimmed.strip_prefix('/')?;
    let cmd = name.split_whitespace().next().unwrap_or("").to_lowercase();

    if let Ok(n) = cmd.parse::<usize>() {
        return Some(ChatCommand::Suggestion(n));
    }

    match cmd.as_str() {
        "help" | "h" | "?" => Some(ChatCommand::Help),
        "clear" | "reset" => Some(ChatCommand::Clear),
        "suggestions" | "s" => Some(ChatCommand::Suggestions),
        "history" => Some(ChatCommand::History),
        "exit" | "quit" | "q" => Some(ChatCommand::Exit),
        _ => Some(ChatCommand::Unknown(format!("/{cmd}"))),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}         {}", style("/help").cyan(), "Show this help message");
    println!("  {}        {}", style("/clear").cyan(), "Erase the conversation");
    println!("  {}  {}", style("/suggestions").cyan(), "List conversation starters");
    println!("  {}   {}", style("/1 ... /8").cyan(), "Send a conversation starter");
    println!("  {}      {}", style("/history").cyan(), "Show the conversation so far");
    println!("  {}         {}", style("/exit").cyan(), "End the chat session");
    println!();
    println!(
        "  {}",
        style("Ctrl+C stops the current reply, Ctrl+D exits").dim()
    );
    println!();
}

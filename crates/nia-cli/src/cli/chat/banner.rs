//! Welcome banner display for chat sessions.

use console::style;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(model: &str, storage: &str, has_api_key: bool) {
    println!();
    println!("  {} {}", style("✿").magenta(), style("NIA").magenta().bold());
    println!("  {}", style("Tu compañera de bienestar").dim());
    println!();
    println!("  {}    {}", style("Model:").bold(), style(model).dim());
    println!("  {}  {}", style("Storage:").bold(), style(storage).dim());
    if !has_api_key {
        println!();
        println!(
            "  {} GEMINI_API_KEY is not set; replies will fail until it is.",
            style("!").yellow().bold()
        );
    }
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+C stops a reply, Ctrl+D exits").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}

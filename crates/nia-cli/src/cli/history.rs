//! One-shot transcript commands: `history`, `clear`, `suggestions`.

use anyhow::Result;
use console::style;

use nia_types::chat::{ChatRole, Message};

use crate::cli::chat::renderer::print_message;
use crate::state::AppState;

/// Print the stored conversation, system prompt excluded.
pub async fn show_history(state: &AppState, json: bool) -> Result<()> {
    let transcript = state.manager.transcript().await;
    let conversation = conversation(&transcript);

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
        return Ok(());
    }

    if conversation.is_empty() {
        println!();
        println!(
            "  {}",
            style("No conversation yet. Start one with: nia chat").dim()
        );
        println!();
        return Ok(());
    }

    println!();
    for message in &conversation {
        print_message(message);
    }
    println!(
        "  {} {} messages ({} storage, {})",
        style("·").dim(),
        conversation.len(),
        state.storage,
        style(state.data_dir.display()).dim()
    );
    println!();
    Ok(())
}

/// Reset the stored conversation to the system prompt.
pub async fn clear_history(state: &AppState, json: bool) -> Result<()> {
    state.manager.clear().await?;

    if json {
        let result = serde_json::json!({
            "cleared": true,
            "storage_key": state.config.storage_key,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!("  {} Conversation cleared.", style("✓").green().bold());
        println!();
    }
    Ok(())
}

/// List the conversation starters, numbered for `/N` in the chat loop.
pub fn show_suggestions(state: &AppState, json: bool) -> Result<()> {
    let suggestions = state.manager.suggestions();

    if json {
        println!("{}", serde_json::to_string_pretty(suggestions)?);
        return Ok(());
    }

    println!();
    print_suggestions(suggestions);
    println!();
    Ok(())
}

pub fn print_suggestions(suggestions: &[String]) {
    println!("  {}", style("Ideas para empezar:").bold());
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!("  {} {}", style(format!("/{}", i + 1)).cyan(), suggestion);
    }
}

fn conversation(transcript: &[Message]) -> Vec<&Message> {
    transcript
        .iter()
        .filter(|m| m.role != ChatRole::System)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_skips_system_prompt() {
        let transcript = vec![
            Message::system("p"),
            Message::user("Hola"),
            Message::model("¡Hola!"),
        ];
        let visible = conversation(&transcript);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].role, ChatRole::User);
    }

    #[test]
    fn test_conversation_serializes_roles_lowercase() {
        let transcript = vec![Message::system("p"), Message::user("Hola")];
        let json = serde_json::to_value(conversation(&transcript)).unwrap();
        assert_eq!(json[0]["role"], "user");
        assert_eq!(json[0]["content"], "Hola");
    }
}

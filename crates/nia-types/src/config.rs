//! Configuration types for the NIA companion.
//!
//! `NiaConfig` represents `config.toml` in the data directory. Every field
//! has a default, so an empty or missing file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::prompt::{SESSION_KEY, SUGGESTIONS, SYSTEM_PROMPT};

/// Top-level configuration, loaded from `~/.nia/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NiaConfig {
    /// Model identifier passed to the chat endpoint.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Key the transcript is persisted under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Capacity of the transcript event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Overrides the built-in system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Overrides the built-in conversation starters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_storage_key() -> String {
    SESSION_KEY.to_string()
}

fn default_event_capacity() -> usize {
    1024
}

impl Default for NiaConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base_url: default_api_base_url(),
            storage_key: default_storage_key(),
            event_capacity: default_event_capacity(),
            system_prompt: None,
            suggestions: None,
        }
    }
}

impl NiaConfig {
    /// The effective system prompt.
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(SYSTEM_PROMPT)
    }

    /// The effective conversation starters.
    pub fn suggestions(&self) -> Vec<String> {
        match &self.suggestions {
            Some(list) => list.clone(),
            None => SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

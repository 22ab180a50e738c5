//! Transcript message and session handle types.
//!
//! Messages serialize as `{"role": "...", "content": "..."}`, the same shape
//! the portal's browser history used, so stored transcripts stay readable
//! by either side.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a transcript entry.
///
/// `Model` (not `Assistant`) matches the role vocabulary of the remote
/// chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Model,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Model => write!(f, "model"),
        }
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(ChatRole::System),
            "user" => Ok(ChatRole::User),
            "model" => Ok(ChatRole::Model),
            other => Err(format!("invalid chat role: '{other}'")),
        }
    }
}

/// One conversational turn in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: ChatRole,
    #[serde(default)]
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }

    /// Empty `model` entry that streaming deltas are appended to.
    pub fn placeholder() -> Self {
        Self::model(String::new())
    }
}

/// Opaque reference to a remote conversational context.
///
/// The endpoint is treated as a context-replay service: the handle carries
/// the transcript it was seeded from, and the endpoint replays it on every
/// turn. Only the chat session manager creates and holds handles.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    created_at: DateTime<Utc>,
    context: Arc<[Message]>,
}

impl SessionHandle {
    /// Seed a new handle from a transcript snapshot.
    pub fn seeded(transcript: &[Message]) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            context: Arc::from(transcript),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The transcript this handle was seeded from.
    pub fn context(&self) -> &[Message] {
        &self.context
    }

    /// Number of messages in the seed transcript.
    pub fn seed_len(&self) -> usize {
        self.context.len()
    }
}

//! Transcript change notifications.
//!
//! `TranscriptEvent` is broadcast by the chat session manager whenever the
//! transcript changes, so a UI can re-render. All variants are
//! Clone + Send + Sync for use with tokio broadcast channels.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::Message;

/// How a turn ended, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Completed,
    Aborted,
    RateLimited,
    RemoteFailure,
    RemoteUnavailable,
}

/// Events emitted as the transcript changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEvent {
    /// A message was appended at `index`.
    MessageAppended { index: usize, message: Message },

    /// A streaming delta was appended to the in-flight `model` message.
    DeltaApplied { turn_id: Uuid, text: String },

    /// The in-flight message content was replaced (error sentinel).
    LastReplaced { content: String },

    /// A turn finished and its transcript was persisted.
    TurnFinished {
        turn_id: Uuid,
        status: TurnStatus,
        deltas: usize,
    },

    /// The transcript was reset to the system prompt.
    Cleared,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_tag() {
        let event = TranscriptEvent::TurnFinished {
            turn_id: Uuid::now_v7(),
            status: TurnStatus::Aborted,
            deltas: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "turn_finished");
        assert_eq!(json["status"], "aborted");
    }

    #[test]
    fn test_delta_event_roundtrip() {
        let event = TranscriptEvent::DeltaApplied {
            turn_id: Uuid::now_v7(),
            text: "¡Hola".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: TranscriptEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, TranscriptEvent::DeltaApplied { text, .. } if text == "¡Hola"));
    }
}

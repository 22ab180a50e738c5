//! Transcript store: the ordered, persisted conversation history.
//!
//! The store owns the message sequence and its persistence key. The first
//! message is always the `system` prompt; every other mutation goes through
//! `append` or `mutate_last`, and `persist` writes the whole sequence.

use nia_types::chat::{ChatRole, Message};
use nia_types::error::{ChatError, StorageError};
use tracing::{debug, warn};

use crate::storage::persistence::TranscriptPersistence;

/// Ordered message history backed by a [`TranscriptPersistence`].
pub struct TranscriptStore<P: TranscriptPersistence> {
    persistence: P,
    key: String,
    system_prompt: String,
    messages: Vec<Message>,
    /// Bumped on every `clear`, so a turn can tell its transcript was reset.
    epoch: u64,
}

impl<P: TranscriptPersistence> TranscriptStore<P> {
    /// Create a store holding only the system prompt. Call [`load`](Self::load)
    /// to pick up a previously persisted transcript.
    pub fn new(persistence: P, key: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            persistence,
            key: key.into(),
            messages: vec![Message::system(system_prompt.clone())],
            system_prompt,
            epoch: 0,
        }
    }

    /// Load the persisted transcript.
    ///
    /// Absent, unreadable, or undecodable data counts as a first run. A
    /// missing leading `system` message is synthesized. Never fails.
    pub async fn load(&mut self) -> &[Message] {
        let loaded = match self.persistence.read(&self.key).await {
            Ok(Some(messages)) => messages,
            Ok(None) => {
                debug!(key = %self.key, "No stored transcript, starting fresh");
                Vec::new()
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "Stored transcript unreadable, starting fresh");
                Vec::new()
            }
        };

        self.messages = normalize(loaded, &self.system_prompt);
        debug!(key = %self.key, messages = self.messages.len(), "Transcript loaded");
        &self.messages
    }

    /// Append a message to the end of the transcript.
    pub fn append(&mut self, message: Message) -> &[Message] {
        self.messages.push(message);
        &self.messages
    }

    /// Apply `transform` to the content of the last message.
    ///
    /// Only the trailing `model` message may be mutated.
    pub fn mutate_last<F>(&mut self, transform: F) -> Result<&Message, ChatError>
    where
        F: FnOnce(&mut String),
    {
        let last = self
            .messages
            .last_mut()
            .ok_or_else(|| ChatError::InvalidState("transcript is empty".to_string()))?;

        if last.role != ChatRole::Model {
            return Err(ChatError::InvalidState(format!(
                "last message has role '{}', expected 'model'",
                last.role
            )));
        }

        transform(&mut last.content);
        Ok(last)
    }

    /// Write the full transcript under the session key.
    pub async fn persist(&self) -> Result<(), StorageError> {
        self.persistence.write(&self.key, &self.messages).await?;
        debug!(key = %self.key, messages = self.messages.len(), "Transcript persisted");
        Ok(())
    }

    /// Reset to the system prompt alone and persist immediately.
    pub async fn clear(&mut self) -> Result<(), StorageError> {
        self.messages = vec![Message::system(self.system_prompt.clone())];
        self.epoch += 1;
        self.persist().await
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether anything beyond the system prompt has been said.
    pub fn has_history(&self) -> bool {
        self.messages.iter().any(|m| m.role != ChatRole::System)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Ensure exactly one `system` message, in first position.
///
/// A stored system message found later in the sequence is moved to the
/// front; if there is none, one is synthesized from `system_prompt`.
fn normalize(loaded: Vec<Message>, system_prompt: &str) -> Vec<Message> {
    let mut system = None;
    let mut rest = Vec::with_capacity(loaded.len());

    for message in loaded {
        if message.role == ChatRole::System {
            if system.is_none() {
                system = Some(message);
            }
        } else {
            rest.push(message);
        }
    }

    let mut messages = Vec::with_capacity(rest.len() + 1);
    messages.push(system.unwrap_or_else(|| Message::system(system_prompt)));
    messages.extend(rest);
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::MemoryPersistence;

    const KEY: &str = "nia-chat-history-v1";
    const PROMPT: &str = "Eres NIA.";

    fn store(persistence: MemoryPersistence) -> TranscriptStore<MemoryPersistence> {
        TranscriptStore::new(persistence, KEY, PROMPT)
    }

    #[tokio::test]
    async fn test_load_empty_store_synthesizes_system() {
        let mut transcript = store(MemoryPersistence::default());
        let loaded = transcript.load().await;
        assert_eq!(loaded, &[Message::system(PROMPT)]);
        assert!(!transcript.has_history());
    }

    #[tokio::test]
    async fn test_load_empty_sequence_synthesizes_system() {
        let mut transcript = store(MemoryPersistence::with(KEY, Vec::new()));
        assert_eq!(transcript.load().await, &[Message::system(PROMPT)]);
    }

    #[tokio::test]
    async fn test_load_prepends_missing_system() {
        let persisted = vec![Message::user("Hola"), Message::model("¡Hola!")];
        let mut transcript = store(MemoryPersistence::with(KEY, persisted));

        let loaded = transcript.load().await.to_vec();
        assert_eq!(
            loaded,
            vec![
                Message::system(PROMPT),
                Message::user("Hola"),
                Message::model("¡Hola!"),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_moves_stray_system_to_front() {
        let persisted = vec![
            Message::user("Hola"),
            Message::system("prompt viejo"),
            Message::system("duplicado"),
        ];
        let mut transcript = store(MemoryPersistence::with(KEY, persisted));

        let loaded = transcript.load().await.to_vec();
        assert_eq!(
            loaded,
            vec![Message::system("prompt viejo"), Message::user("Hola")]
        );
    }

    #[tokio::test]
    async fn test_load_corrupt_data_is_first_run() {
        let persistence = MemoryPersistence::with(KEY, vec![Message::user("perdido")]);
        persistence.set_corrupt(true);
        let mut transcript = store(persistence);
        assert_eq!(transcript.load().await, &[Message::system(PROMPT)]);
    }

    #[tokio::test]
    async fn test_persist_then_load_roundtrip() {
        let persistence = MemoryPersistence::default();
        let mut transcript = store(persistence.clone());
        transcript.append(Message::user("¿Qué es el Jardín Mental?"));
        transcript.append(Message::model("Un lugar para sembrar ideas."));
        transcript.persist().await.unwrap();

        let expected = transcript.snapshot();
        let mut reloaded = store(persistence);
        assert_eq!(reloaded.load().await, expected.as_slice());
    }

    #[test]
    fn test_mutate_last_extends_model_message() {
        let mut transcript = store(MemoryPersistence::default());
        transcript.append(Message::user("Hola"));
        transcript.append(Message::placeholder());

        transcript.mutate_last(|c| c.push_str("¡Hola")).unwrap();
        let last = transcript.mutate_last(|c| c.push_str("!")).unwrap();
        assert_eq!(last.content, "¡Hola!");
    }

    #[test]
    fn test_mutate_last_rejects_non_model() {
        let mut transcript = store(MemoryPersistence::default());
        transcript.append(Message::user("Hola"));

        let err = transcript.mutate_last(|c| c.push_str("x")).unwrap_err();
        assert!(matches!(err, ChatError::InvalidState(_)));
        assert_eq!(transcript.last().unwrap().content, "Hola");
    }

    #[test]
    fn test_mutate_last_rejects_empty_transcript() {
        let mut transcript = store(MemoryPersistence::default());
        transcript.messages.clear();

        let err = transcript.mutate_last(|c| c.push_str("x")).unwrap_err();
        assert!(matches!(err, ChatError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_clear_resets_and_persists() {
        let persistence = MemoryPersistence::default();
        let mut transcript = store(persistence.clone());
        transcript.append(Message::user("Hola"));
        transcript.persist().await.unwrap();

        transcript.clear().await.unwrap();
        assert_eq!(transcript.messages(), &[Message::system(PROMPT)]);
        assert_eq!(transcript.epoch(), 1);
        assert_eq!(persistence.stored(KEY).unwrap(), vec![Message::system(PROMPT)]);

        let mut reloaded = store(persistence);
        assert_eq!(reloaded.load().await, &[Message::system(PROMPT)]);
    }

    #[tokio::test]
    async fn test_persist_surfaces_write_failure() {
        let persistence = MemoryPersistence::default();
        persistence.set_fail_writes(true);
        let transcript = store(persistence);

        let err = transcript.persist().await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}

//! In-memory transcript persistence for ephemeral sessions.
//!
//! Nothing survives the process. Clones share the same slots, so a CLI
//! session and its tests can observe what was checkpointed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use nia_core::storage::persistence::TranscriptPersistence;
use nia_types::chat::Message;
use nia_types::error::StorageError;

#[derive(Clone, Default)]
pub struct InMemoryTranscriptStore {
    slots: Arc<RwLock<HashMap<String, Vec<Message>>>>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranscriptPersistence for InMemoryTranscriptStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<Message>>, StorageError> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, messages: &[Message]) -> Result<(), StorageError> {
        self.slots
            .write()
            .await
            .insert(key.to_string(), messages.to_vec());
        Ok(())
    }
}

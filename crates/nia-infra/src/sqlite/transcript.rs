//! SQLite transcript persistence.
//!
//! Implements `TranscriptPersistence` from `nia-core`. Each session key maps
//! to one row holding the whole message sequence as JSON text.

use chrono::Utc;
use sqlx::Row;

use nia_core::storage::persistence::TranscriptPersistence;
use nia_types::chat::Message;
use nia_types::error::StorageError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TranscriptPersistence`.
#[derive(Clone)]
pub struct SqliteTranscriptStore {
    pool: DatabasePool,
}

impl SqliteTranscriptStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl TranscriptPersistence for SqliteTranscriptStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<Message>>, StorageError> {
        let row = sqlx::query("SELECT messages FROM chat_transcripts WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row
            .try_get("messages")
            .map_err(|e| StorageError::Query(e.to_string()))?;
        let messages: Vec<Message> = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Corrupt(format!("invalid transcript JSON: {e}")))?;
        Ok(Some(messages))
    }

    async fn write(&self, key: &str, messages: &[Message]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(messages)
            .map_err(|e| StorageError::Query(format!("failed to serialize transcript: {e}")))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO chat_transcripts (key, messages, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET messages = excluded.messages, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(&raw)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        Ok(())
    }
}

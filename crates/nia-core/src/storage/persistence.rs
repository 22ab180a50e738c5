//! Transcript persistence trait.
//!
//! Defines the key-based durable storage the transcript is written to.
//! Implementations live in nia-infra.

use nia_types::chat::Message;
use nia_types::error::StorageError;

/// Key-based durable storage for a chat transcript.
///
/// Writes overwrite the whole sequence stored under a key; there is no merge.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait TranscriptPersistence: Send + Sync {
    /// Read the transcript stored under `key`. Returns None if nothing is stored.
    ///
    /// Undecodable data is reported as [`StorageError::Corrupt`].
    fn read(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<Message>>, StorageError>> + Send;

    /// Replace the transcript stored under `key`.
    fn write(
        &self,
        key: &str,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}

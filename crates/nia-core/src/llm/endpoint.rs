//! ChatEndpoint trait definition.
//!
//! The core abstraction over the backend chat-completion API. Uses RPITIT
//! for `create_session` and `Pin<Box<dyn Stream>>` for `stream_turn`, so the
//! returned stream can outlive the borrow of the endpoint.

use std::pin::Pin;

use futures_util::Stream;
use tokio_util::sync::CancellationToken;

use nia_types::chat::{Message, SessionHandle};
use nia_types::error::EndpointError;

/// Lazy, finite sequence of text deltas for one turn.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, EndpointError>> + Send + 'static>>;

/// Trait for remote chat backends.
///
/// Implementations live in nia-infra (e.g., `GeminiEndpoint`).
pub trait ChatEndpoint: Send + Sync {
    /// Human-readable endpoint name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Create a session handle seeded with the given transcript.
    ///
    /// Fails with [`EndpointError::Unavailable`] when no session can be created.
    fn create_session(
        &self,
        transcript: &[Message],
    ) -> impl std::future::Future<Output = Result<SessionHandle, EndpointError>> + Send;

    /// Stream the model's reply to `user_text` within the given session.
    ///
    /// The stream is not restartable. It terminates normally at end of turn,
    /// terminates early once `cancel` fires, and yields
    /// `RateLimited`/`Failure` errors on quota or transport problems.
    fn stream_turn(
        &self,
        handle: &SessionHandle,
        user_text: &str,
        cancel: CancellationToken,
    ) -> DeltaStream;
}

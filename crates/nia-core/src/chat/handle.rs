//! Session handle manager.
//!
//! Keeps one remote session handle consistent with the committed
//! transcript. Handles are never patched: every refresh re-derives a new
//! handle from the full transcript, so a stateless context-replay endpoint
//! works as well as a stateful one.

use nia_types::chat::{Message, SessionHandle};
use nia_types::error::ChatError;
use tracing::{debug, warn};

use crate::llm::endpoint::ChatEndpoint;

/// Owns the chat endpoint and the current session handle.
pub struct SessionHandleManager<E: ChatEndpoint> {
    endpoint: E,
    current: Option<SessionHandle>,
}

impl<E: ChatEndpoint> SessionHandleManager<E> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            current: None,
        }
    }

    /// Replace the current handle with one seeded from `transcript`.
    ///
    /// When the endpoint cannot create a session the previous handle, if
    /// any, stays in use and is returned; otherwise the failure is returned.
    pub async fn refresh(&mut self, transcript: &[Message]) -> Result<SessionHandle, ChatError> {
        match self.endpoint.create_session(transcript).await {
            Ok(handle) => {
                debug!(
                    endpoint = self.endpoint.name(),
                    handle_id = %handle.id(),
                    seed_len = handle.seed_len(),
                    "Session handle refreshed"
                );
                self.current = Some(handle.clone());
                Ok(handle)
            }
            Err(err) => match &self.current {
                Some(previous) => {
                    warn!(
                        endpoint = self.endpoint.name(),
                        handle_id = %previous.id(),
                        error = %err,
                        "Session refresh failed, keeping previous handle"
                    );
                    Ok(previous.clone())
                }
                None => Err(ChatError::RemoteUnavailable(err.to_string())),
            },
        }
    }

    /// Drop the current handle so no later refresh can fall back to it.
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&SessionHandle> {
        self.current.as_ref()
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::ScriptedEndpoint;

    #[tokio::test]
    async fn test_refresh_replaces_handle() {
        let endpoint = ScriptedEndpoint::default();
        let mut handles = SessionHandleManager::new(endpoint.clone());

        let first = handles.refresh(&[Message::system("p")]).await.unwrap();
        let second = handles
            .refresh(&[Message::system("p"), Message::user("Hola")])
            .await
            .unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(handles.current().unwrap().id(), second.id());
        assert_eq!(second.seed_len(), 2);
        assert_eq!(endpoint.seeds().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_failure_without_previous_is_surfaced() {
        let endpoint = ScriptedEndpoint::default();
        endpoint.set_sessions_down(true);
        let mut handles = SessionHandleManager::new(endpoint);

        let err = handles.refresh(&[Message::system("p")]).await.unwrap_err();
        assert!(matches!(err, ChatError::RemoteUnavailable(_)));
        assert!(handles.current().is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_handle() {
        let endpoint = ScriptedEndpoint::default();
        let mut handles = SessionHandleManager::new(endpoint.clone());
        let first = handles.refresh(&[Message::system("p")]).await.unwrap();

        endpoint.set_sessions_down(true);
        let degraded = handles
            .refresh(&[Message::system("p"), Message::user("Hola")])
            .await
            .unwrap();

        assert_eq!(degraded.id(), first.id());
        assert_eq!(degraded.seed_len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_disables_fallback() {
        let endpoint = ScriptedEndpoint::default();
        let mut handles = SessionHandleManager::new(endpoint.clone());
        handles.refresh(&[Message::system("p")]).await.unwrap();

        handles.invalidate();
        endpoint.set_sessions_down(true);

        let err = handles.refresh(&[Message::system("p")]).await.unwrap_err();
        assert!(matches!(err, ChatError::RemoteUnavailable(_)));
        assert!(handles.current().is_none());
    }
}

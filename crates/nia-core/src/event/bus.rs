//! Broadcast bus for distributing `TranscriptEvent`s to UI subscribers.
//!
//! Built on `tokio::sync::broadcast`. Publishing with no active subscribers
//! is a no-op; a slow subscriber lags instead of blocking the turn.

use nia_types::event::TranscriptEvent;
use tokio::sync::broadcast;

/// Multi-consumer bus for transcript change notifications.
pub struct TranscriptBus {
    sender: broadcast::Sender<TranscriptEvent>,
}

impl TranscriptBus {
    /// Create a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: TranscriptEvent) {
        let _ = self.sender.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Clone for TranscriptBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for TranscriptBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

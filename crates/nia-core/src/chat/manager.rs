//! Chat session manager: the streaming turn controller.
//!
//! `ChatSessionManager` owns the transcript store, the session handle
//! manager, a busy flag and the cancellation token of the running turn.
//! One turn runs at a time; a second `run_turn` while busy is rejected, not
//! queued. Deltas are pulled from the endpoint stream one at a time and
//! raced against the cancellation token, so cancelling stops consumption at
//! the next suspension point without rewinding what was already applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use futures_util::StreamExt;
use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use nia_types::chat::{ChatRole, Message, SessionHandle};
use nia_types::config::NiaConfig;
use nia_types::error::{ChatError, EndpointError};
use nia_types::event::{TranscriptEvent, TurnStatus};
use nia_types::prompt::ERROR_SENTINEL;

use crate::chat::handle::SessionHandleManager;
use crate::chat::transcript::TranscriptStore;
use crate::event::bus::TranscriptBus;
use crate::llm::endpoint::ChatEndpoint;
use crate::storage::persistence::TranscriptPersistence;

/// Result of a turn that ran to completion.
#[derive(Debug, Clone)]
pub struct TurnSummary {
    pub turn_id: Uuid,
    /// Number of deltas applied to the reply.
    pub deltas: usize,
    /// Length of the final reply in characters.
    pub chars: usize,
    pub elapsed_ms: u64,
}

/// Streaming chat session over a persisted transcript.
///
/// Generic over `TranscriptPersistence` and `ChatEndpoint` to maintain clean
/// architecture (nia-core never depends on nia-infra). Share it behind an
/// `Arc` so `cancel` can be called while `run_turn` is suspended.
pub struct ChatSessionManager<P: TranscriptPersistence, E: ChatEndpoint> {
    transcript: AsyncMutex<TranscriptStore<P>>,
    handles: AsyncMutex<SessionHandleManager<E>>,
    busy: AtomicBool,
    /// Cancellation token of the running turn, if any.
    cursor: Mutex<Option<CancellationToken>>,
    bus: TranscriptBus,
    suggestions: Vec<String>,
}

impl<P: TranscriptPersistence, E: ChatEndpoint> ChatSessionManager<P, E> {
    /// Load the persisted transcript and seed the first session handle.
    ///
    /// A failed initial refresh is logged and left for the next turn to retry.
    pub async fn open(persistence: P, endpoint: E, config: &NiaConfig) -> Self {
        let mut transcript = TranscriptStore::new(
            persistence,
            config.storage_key.clone(),
            config.system_prompt(),
        );
        let seed = transcript.load().await.to_vec();

        let mut handles = SessionHandleManager::new(endpoint);
        if let Err(err) = handles.refresh(&seed).await {
            warn!(error = %err, "Initial session refresh failed, retrying on next turn");
        }

        info!(
            key = %config.storage_key,
            messages = seed.len(),
            endpoint = handles.endpoint().name(),
            "Chat session opened"
        );

        Self {
            transcript: AsyncMutex::new(transcript),
            handles: AsyncMutex::new(handles),
            busy: AtomicBool::new(false),
            cursor: Mutex::new(None),
            bus: TranscriptBus::new(config.event_capacity),
            suggestions: config.suggestions(),
        }
    }

    /// Run one user -> model exchange, streaming the reply into the transcript.
    ///
    /// Returns `Busy` without touching anything if another turn is running.
    /// On cancellation the partial reply is kept and `Aborted` is returned.
    /// On endpoint failure an empty reply is replaced with the error sentinel
    /// and the classified error is returned. The transcript is persisted and
    /// the session handle refreshed on every path once the turn has started.
    pub async fn run_turn(&self, user_text: &str) -> Result<TurnSummary, ChatError> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let token = CancellationToken::new();
        let Some(_guard) = TurnGuard::acquire(&self.busy, &self.cursor, token.clone()) else {
            debug!("Turn rejected, another turn is running");
            return Err(ChatError::Busy);
        };

        let turn_id = Uuid::now_v7();
        self.drive_turn(turn_id, text, token)
            .instrument(info_span!("chat_turn", %turn_id))
            .await
    }

    /// Cancel the running turn. Returns false when no turn is running.
    pub fn cancel(&self) -> bool {
        match lock_cursor(&self.cursor).as_ref() {
            Some(token) => {
                if !token.is_cancelled() {
                    info!("Turn cancellation requested");
                }
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Abort any running turn, reset the transcript to the system prompt,
    /// persist it, and reseed the session handle. The previous handle is
    /// discarded even if reseeding fails.
    ///
    /// A failed write is returned as `Storage` after the in-memory reset.
    pub async fn clear(&self) -> Result<(), ChatError> {
        self.cancel();

        let (seed, persisted) = {
            let mut transcript = self.transcript.lock().await;
            let persisted = transcript.clear().await;
            (transcript.snapshot(), persisted)
        };
        self.bus.publish(TranscriptEvent::Cleared);
        info!("Transcript cleared");

        // A handle seeded before the clear must not survive a failed refresh.
        let mut handles = self.handles.lock().await;
        handles.invalidate();
        if let Err(err) = handles.refresh(&seed).await {
            warn!(error = %err, "Session refresh after clear failed");
        }
        drop(handles);

        persisted.map_err(ChatError::from)
    }

    /// Snapshot of the current transcript, system prompt included.
    pub async fn transcript(&self) -> Vec<Message> {
        self.transcript.lock().await.snapshot()
    }

    /// Whether anything beyond the system prompt has been said.
    pub async fn has_history(&self) -> bool {
        self.transcript.lock().await.has_history()
    }

    pub async fn current_handle(&self) -> Option<SessionHandle> {
        self.handles.lock().await.current().cloned()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Subscribe to transcript change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.bus.subscribe()
    }

    /// Conversation starters to offer while the transcript is empty.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    async fn drive_turn(
        &self,
        turn_id: Uuid,
        text: &str,
        token: CancellationToken,
    ) -> Result<TurnSummary, ChatError> {
        let started = Instant::now();

        let (seed, epoch) = {
            let mut transcript = self.transcript.lock().await;
            transcript.append(Message::user(text));
            self.publish_appended(&transcript);
            self.checkpoint(&transcript).await;
            (transcript.snapshot(), transcript.epoch())
        };

        let handle = match self.handles.lock().await.refresh(&seed).await {
            Ok(handle) => handle,
            Err(err) => {
                warn!(error = %err, "No session handle available, turn not started");
                self.finish(turn_id, TurnStatus::RemoteUnavailable, 0);
                return Err(err);
            }
        };

        {
            let mut transcript = self.transcript.lock().await;
            if transcript.epoch() != epoch {
                info!("Transcript cleared before the reply started");
                self.finish(turn_id, TurnStatus::Aborted, 0);
                return Err(ChatError::Aborted);
            }
            transcript.append(Message::placeholder());
            self.publish_appended(&transcript);
            self.checkpoint(&transcript).await;
        }

        let mut stream = self
            .handles
            .lock()
            .await
            .endpoint()
            .stream_turn(&handle, text, token.clone());

        let mut deltas = 0usize;
        let outcome: Result<(), ChatError> = loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break Err(ChatError::Aborted),

                next = stream.next() => match next {
                    Some(Ok(delta)) => {
                        if delta.is_empty() {
                            continue;
                        }
                        let mut transcript = self.transcript.lock().await;
                        if transcript.epoch() != epoch {
                            break Err(ChatError::Aborted);
                        }
                        if let Err(err) = transcript.mutate_last(|content| content.push_str(&delta)) {
                            break Err(err);
                        }
                        deltas += 1;
                        self.bus.publish(TranscriptEvent::DeltaApplied { turn_id, text: delta });
                    }
                    Some(Err(err)) => break Err(classify_stream_error(err)),
                    None if token.is_cancelled() => break Err(ChatError::Aborted),
                    None => break Ok(()),
                },
            }
        };
        drop(stream);

        let (seed, chars) = {
            let mut transcript = self.transcript.lock().await;
            let mut chars = 0;
            if transcript.epoch() == epoch {
                if matches!(
                    outcome,
                    Err(ChatError::RateLimited { .. } | ChatError::RemoteFailure(_))
                ) {
                    self.fill_empty_reply(&mut transcript);
                }
                self.checkpoint(&transcript).await;
                chars = transcript
                    .last()
                    .map(|m| m.content.chars().count())
                    .unwrap_or(0);
            }
            (transcript.snapshot(), chars)
        };

        if let Err(err) = self.handles.lock().await.refresh(&seed).await {
            warn!(error = %err, "Session refresh after turn failed");
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.finish(turn_id, status_of(&outcome), deltas);

        match outcome {
            Ok(()) => {
                info!(deltas, chars, elapsed_ms, "Turn completed");
                Ok(TurnSummary {
                    turn_id,
                    deltas,
                    chars,
                    elapsed_ms,
                })
            }
            Err(err) if err.is_fault() => {
                warn!(deltas, chars, elapsed_ms, error = %err, "Turn failed");
                Err(err)
            }
            Err(err) => {
                info!(deltas, chars, elapsed_ms, "Turn aborted");
                Err(err)
            }
        }
    }

    /// Replace a still-empty reply with the error sentinel.
    fn fill_empty_reply(&self, transcript: &mut TranscriptStore<P>) {
        let empty = matches!(
            transcript.last(),
            Some(last) if last.role == ChatRole::Model && last.content.is_empty()
        );
        if empty && transcript.mutate_last(|c| c.push_str(ERROR_SENTINEL)).is_ok() {
            self.bus.publish(TranscriptEvent::LastReplaced {
                content: ERROR_SENTINEL.to_string(),
            });
        }
    }

    /// Persist at a turn checkpoint. Write failures are warnings, not turn errors.
    async fn checkpoint(&self, transcript: &TranscriptStore<P>) {
        if let Err(err) = transcript.persist().await {
            warn!(key = transcript.key(), error = %err, "Transcript checkpoint failed");
        }
    }

    fn publish_appended(&self, transcript: &TranscriptStore<P>) {
        if let Some(message) = transcript.last() {
            self.bus.publish(TranscriptEvent::MessageAppended {
                index: transcript.len() - 1,
                message: message.clone(),
            });
        }
    }

    fn finish(&self, turn_id: Uuid, status: TurnStatus, deltas: usize) {
        self.bus.publish(TranscriptEvent::TurnFinished {
            turn_id,
            status,
            deltas,
        });
    }
}

/// Holds the busy flag and the turn's cancellation token for one turn.
///
/// Dropping the guard releases both, whichever way the turn exits.
struct TurnGuard<'a> {
    busy: &'a AtomicBool,
    cursor: &'a Mutex<Option<CancellationToken>>,
}

impl<'a> TurnGuard<'a> {
    fn acquire(
        busy: &'a AtomicBool,
        cursor: &'a Mutex<Option<CancellationToken>>,
        token: CancellationToken,
    ) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        *lock_cursor(cursor) = Some(token);
        Some(Self { busy, cursor })
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        *lock_cursor(self.cursor) = None;
        self.busy.store(false, Ordering::Release);
    }
}

fn lock_cursor(
    cursor: &Mutex<Option<CancellationToken>>,
) -> MutexGuard<'_, Option<CancellationToken>> {
    cursor.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mid-stream errors are either quota exhaustion or generic failures.
fn classify_stream_error(err: EndpointError) -> ChatError {
    match err {
        EndpointError::RateLimited { retry_after_ms } => ChatError::RateLimited { retry_after_ms },
        EndpointError::Unavailable(message) | EndpointError::Failure(message) => {
            ChatError::RemoteFailure(message)
        }
    }
}

fn status_of(outcome: &Result<(), ChatError>) -> TurnStatus {
    match outcome {
        Ok(()) => TurnStatus::Completed,
        Err(ChatError::Aborted) => TurnStatus::Aborted,
        Err(ChatError::RateLimited { .. }) => TurnStatus::RateLimited,
        Err(ChatError::RemoteUnavailable(_)) => TurnStatus::RemoteUnavailable,
        Err(_) => TurnStatus::RemoteFailure,
    }
}

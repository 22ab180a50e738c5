//! In-memory fakes for the persistence and endpoint traits.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use nia_types::chat::{Message, SessionHandle};
use nia_types::error::{EndpointError, StorageError};

use crate::llm::endpoint::{ChatEndpoint, DeltaStream};
use crate::storage::persistence::TranscriptPersistence;

/// Shared in-memory persistence. Clones see the same slots.
#[derive(Clone, Default)]
pub struct MemoryPersistence {
    slots: Arc<Mutex<HashMap<String, Vec<Message>>>>,
    corrupt: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryPersistence {
    pub fn with(key: &str, messages: Vec<Message>) -> Self {
        let store = Self::default();
        store.slots.lock().unwrap().insert(key.to_string(), messages);
        store
    }

    pub fn stored(&self, key: &str) -> Option<Vec<Message>> {
        self.slots.lock().unwrap().get(key).cloned()
    }

    pub fn set_corrupt(&self, corrupt: bool) {
        self.corrupt.store(corrupt, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl TranscriptPersistence for MemoryPersistence {
    async fn read(&self, key: &str) -> Result<Option<Vec<Message>>, StorageError> {
        if self.corrupt.load(Ordering::SeqCst) {
            return Err(StorageError::Corrupt("expected value at line 1".to_string()));
        }
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    async fn write(&self, key: &str, messages: &[Message]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.slots
            .lock()
            .unwrap()
            .insert(key.to_string(), messages.to_vec());
        Ok(())
    }
}

/// One step of a scripted reply stream.
#[derive(Debug, Clone)]
pub enum Step {
    Delta(&'static str),
    /// Park until the turn's cancellation token fires.
    WaitForCancel,
    RateLimited,
    Failure(&'static str),
}

/// Endpoint that replays scripted replies and records every session seed.
#[derive(Clone, Default)]
pub struct ScriptedEndpoint {
    scripts: Arc<Mutex<VecDeque<Vec<Step>>>>,
    seeds: Arc<Mutex<Vec<Vec<Message>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    sessions_down: Arc<AtomicBool>,
}

impl ScriptedEndpoint {
    pub fn with_script(steps: Vec<Step>) -> Self {
        let endpoint = Self::default();
        endpoint.push_script(steps);
        endpoint
    }

    pub fn push_script(&self, steps: Vec<Step>) {
        self.scripts.lock().unwrap().push_back(steps);
    }

    pub fn set_sessions_down(&self, down: bool) {
        self.sessions_down.store(down, Ordering::SeqCst);
    }

    pub fn seeds(&self) -> Vec<Vec<Message>> {
        self.seeds.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ChatEndpoint for ScriptedEndpoint {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create_session(&self, transcript: &[Message]) -> Result<SessionHandle, EndpointError> {
        if self.sessions_down.load(Ordering::SeqCst) {
            return Err(EndpointError::Unavailable("connection refused".to_string()));
        }
        self.seeds.lock().unwrap().push(transcript.to_vec());
        Ok(SessionHandle::seeded(transcript))
    }

    fn stream_turn(
        &self,
        _handle: &SessionHandle,
        user_text: &str,
        cancel: CancellationToken,
    ) -> DeltaStream {
        self.prompts.lock().unwrap().push(user_text.to_string());
        let steps = self.scripts.lock().unwrap().pop_front().unwrap_or_default();

        Box::pin(async_stream::stream! {
            for step in steps {
                match step {
                    Step::Delta(text) => {
                        tokio::task::yield_now().await;
                        yield Ok(text.to_string());
                    }
                    Step::WaitForCancel => cancel.cancelled().await,
                    Step::RateLimited => {
                        yield Err(EndpointError::RateLimited { retry_after_ms: None });
                        return;
                    }
                    Step::Failure(message) => {
                        yield Err(EndpointError::Failure(message.to_string()));
                        return;
                    }
                }
            }
        })
    }
}

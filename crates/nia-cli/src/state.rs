//! Application state wiring storage and the chat endpoint together.
//!
//! `ChatSessionManager` is generic over its persistence and endpoint;
//! AppState pins it to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use nia_core::chat::manager::ChatSessionManager;
use nia_core::storage::persistence::TranscriptPersistence;
use nia_infra::config::{load_config, resolve_api_key};
use nia_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use nia_infra::llm::create_endpoint;
use nia_infra::llm::gemini::GeminiEndpoint;
use nia_infra::sqlite::pool::{DatabasePool, database_url};
use nia_infra::sqlite::transcript::SqliteTranscriptStore;
use nia_infra::storage::memory::InMemoryTranscriptStore;
use nia_types::chat::Message;
use nia_types::config::NiaConfig;
use nia_types::error::StorageError;

pub type ConcreteChatManager = ChatSessionManager<TranscriptBackend, GeminiEndpoint>;

/// Where the transcript lives for this process.
#[derive(Clone)]
pub enum TranscriptBackend {
    Sqlite(SqliteTranscriptStore),
    Memory(InMemoryTranscriptStore),
}

impl TranscriptBackend {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Memory(_) => "memory",
        }
    }
}

impl TranscriptPersistence for TranscriptBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<Message>>, StorageError> {
        match self {
            Self::Sqlite(store) => store.read(key).await,
            Self::Memory(store) => store.read(key).await,
        }
    }

    async fn write(&self, key: &str, messages: &[Message]) -> Result<(), StorageError> {
        match self {
            Self::Sqlite(store) => store.write(key, messages).await,
            Self::Memory(store) => store.write(key, messages).await,
        }
    }
}

/// Shared application state for all commands.
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: NiaConfig,
    pub manager: Arc<ConcreteChatManager>,
    pub storage: &'static str,
    pub has_api_key: bool,
}

impl AppState {
    /// Resolve the data directory, load config, open storage and the session.
    pub async fn init(ephemeral: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;

        let backend = if ephemeral {
            TranscriptBackend::Memory(InMemoryTranscriptStore::new())
        } else {
            let pool = DatabasePool::new(&database_url(&data_dir))
                .await
                .context("failed to open transcript database")?;
            TranscriptBackend::Sqlite(SqliteTranscriptStore::new(pool))
        };
        let storage = backend.label();

        let endpoint = create_endpoint(&config, resolve_api_key())?;
        let has_api_key = endpoint.has_api_key();

        let manager = ChatSessionManager::open(backend, endpoint, &config).await;

        Ok(Self {
            data_dir,
            config,
            manager: Arc::new(manager),
            storage,
            has_api_key,
        })
    }
}

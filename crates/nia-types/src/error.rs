use thiserror::Error;

/// Errors from the transcript persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("stored transcript is corrupt: {0}")]
    Corrupt(String),
}

/// Errors reported by the remote chat endpoint.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("chat endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("chat endpoint failure: {0}")]
    Failure(String),
}

/// Classified outcome of a failed chat operation.
///
/// Every storage and endpoint failure is converted into one of these kinds
/// at the turn controller boundary. `Aborted` is a user action, not a fault.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("chat session could not be created: {0}")]
    RemoteUnavailable(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("remote failure: {0}")]
    RemoteFailure(String),

    #[error("turn aborted")]
    Aborted,

    #[error("invalid transcript state: {0}")]
    InvalidState(String),

    #[error("a turn is already running")]
    Busy,

    #[error("message is empty")]
    EmptyInput,
}

impl ChatError {
    /// Message shown to the user for this outcome.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Aborted => "Respuesta detenida.".to_string(),
            ChatError::RateLimited { .. } => {
                "Límite de cuota/sesiones alcanzado. Intenta más tarde.".to_string()
            }
            ChatError::RemoteFailure(message) if !message.is_empty() => message.clone(),
            ChatError::Busy => "NIA todavía está respondiendo.".to_string(),
            ChatError::EmptyInput => "Escribe un mensaje antes de enviar.".to_string(),
            ChatError::RemoteUnavailable(_) => {
                "No fue posible conectar con NIA. Intenta de nuevo.".to_string()
            }
            _ => "Error al generar respuesta.".to_string(),
        }
    }

    /// Whether this outcome counts as a fault for logging purposes.
    pub fn is_fault(&self) -> bool {
        !matches!(self, ChatError::Aborted | ChatError::Busy | ChatError::EmptyInput)
    }
}

impl From<EndpointError> for ChatError {
    fn from(err: EndpointError) -> Self {
        match err {
            EndpointError::Unavailable(message) => ChatError::RemoteUnavailable(message),
            EndpointError::RateLimited { retry_after_ms } => {
                ChatError::RateLimited { retry_after_ms }
            }
            EndpointError::Failure(message) => ChatError::RemoteFailure(message),
        }
    }
}

//! Chat endpoint implementations.
//!
//! Contains the concrete implementation of the [`ChatEndpoint`] trait
//! defined in `nia-core` for Google Gemini, plus a factory that builds it
//! from [`NiaConfig`].
//!
//! [`ChatEndpoint`]: nia_core::llm::endpoint::ChatEndpoint

pub mod gemini;

use secrecy::SecretString;

use nia_types::config::NiaConfig;
use nia_types::error::EndpointError;

use self::gemini::GeminiEndpoint;

/// Build the configured chat endpoint.
///
/// A missing API key is not an error here: the endpoint is created and
/// reports `Unavailable` when a session is requested.
pub fn create_endpoint(
    config: &NiaConfig,
    api_key: Option<SecretString>,
) -> Result<GeminiEndpoint, EndpointError> {
    if api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set, chat turns will fail");
    }
    Ok(GeminiEndpoint::new(api_key, config.model.clone())?.with_base_url(config.api_base_url.clone()))
}

//! SSE stream for `streamGenerateContent?alt=sse`.
//!
//! Every `data:` event is one `GenerateContentResponse` chunk; the text of
//! its first candidate is yielded as one delta. The server closes the
//! connection after the last chunk. Retries are disabled: a dropped stream
//! is a failed turn, not something to reconnect.

use futures_util::StreamExt;
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::{Event, EventSource};
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use nia_core::llm::endpoint::DeltaStream;
use nia_types::error::EndpointError;

use super::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Open a streaming request and map SSE chunks to text deltas.
///
/// The request is not sent until the stream is first polled. Cancelling
/// `cancel` ends the stream and closes the connection.
pub fn create_gemini_stream(
    client: &reqwest::Client,
    url: &str,
    body: GenerateContentRequest,
    api_key: &SecretString,
    cancel: CancellationToken,
) -> DeltaStream {
    let request = client
        .post(url)
        .header("x-goog-api-key", api_key.expose_secret())
        .json(&body);

    Box::pin(async_stream::stream! {
        let mut source = match EventSource::new(request) {
            Ok(source) => source,
            Err(err) => {
                yield Err(EndpointError::Failure(format!("cannot open event stream: {err}")));
                return;
            }
        };
        source.set_retry_policy(Box::new(Never));

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Gemini stream cancelled");
                    None
                }
                next = source.next() => next,
            };
            let Some(event) = next else {
                break;
            };

            match event {
                Ok(Event::Open) => debug!("Gemini stream opened"),
                Ok(Event::Message(message)) => match parse_chunk(&message.data) {
                    Ok(Some(text)) => yield Ok(text),
                    Ok(None) => {}
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                },
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let body = response.text().await.unwrap_or_default();
                    yield Err(classify_status(status.as_u16(), &body));
                    break;
                }
                Err(err) => {
                    yield Err(EndpointError::Failure(format!("stream error: {err}")));
                    break;
                }
            }
        }

        source.close();
    })
}

/// Decode one SSE `data:` payload.
pub(crate) fn parse_chunk(data: &str) -> Result<Option<String>, EndpointError> {
    let chunk: GenerateContentResponse = serde_json::from_str(data)
        .map_err(|e| EndpointError::Failure(format!("invalid stream chunk: {e}")))?;

    if let Some(error) = chunk.error {
        if error.code == 429 || error.status == "RESOURCE_EXHAUSTED" {
            return Err(EndpointError::RateLimited {
                retry_after_ms: error.retry_after_ms(),
            });
        }
        return Err(EndpointError::Failure(error.message));
    }

    Ok(chunk.delta_text())
}

/// Map a non-2xx response to an endpoint error.
pub(crate) fn classify_status(status: u16, body: &str) -> EndpointError {
    let error = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);

    let exhausted = error
        .as_ref()
        .is_some_and(|e| e.status == "RESOURCE_EXHAUSTED");
    if status == 429 || exhausted {
        return EndpointError::RateLimited {
            retry_after_ms: error.as_ref().and_then(|e| e.retry_after_ms()),
        };
    }

    let message = match error {
        Some(e) if !e.message.is_empty() => e.message,
        _ => body.trim().to_string(),
    };
    EndpointError::Failure(format!("HTTP {status}: {message}"))
}

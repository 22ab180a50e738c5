//! GeminiEndpoint -- concrete [`ChatEndpoint`] for the Gemini REST API.
//!
//! The REST API is stateless, so a session handle is a snapshot of the
//! transcript it was seeded from and every turn replays that snapshot.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use nia_core::llm::endpoint::{ChatEndpoint, DeltaStream};
use nia_types::chat::{Message, SessionHandle};
use nia_types::error::EndpointError;

use super::streaming::create_gemini_stream;
use super::types::GenerateContentRequest;

/// Gemini chat endpoint.
pub struct GeminiEndpoint {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl GeminiEndpoint {
    /// Create an endpoint for `model`. Without an API key every session
    /// creation fails with `Unavailable`.
    pub fn new(api_key: Option<SecretString>, model: impl Into<String>) -> Result<Self, EndpointError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EndpointError::Unavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: model.into(),
        })
    }

    /// Override the base URL (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl ChatEndpoint for GeminiEndpoint {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn create_session(&self, transcript: &[Message]) -> Result<SessionHandle, EndpointError> {
        if self.api_key.is_none() {
            return Err(EndpointError::Unavailable(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }
        Ok(SessionHandle::seeded(transcript))
    }

    fn stream_turn(
        &self,
        handle: &SessionHandle,
        user_text: &str,
        cancel: CancellationToken,
    ) -> DeltaStream {
        let Some(api_key) = self.api_key.as_ref() else {
            return Box::pin(futures_util::stream::once(async {
                Err(EndpointError::Unavailable("GEMINI_API_KEY is not set".to_string()))
            }));
        };

        let body = GenerateContentRequest::replay(handle.context(), user_text);
        tracing::debug!(
            model = %self.model,
            handle_id = %handle.id(),
            contents = body.contents.len(),
            "Streaming Gemini turn"
        );
        create_gemini_stream(&self.client, &self.stream_url(), body, api_key, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn endpoint(base_url: &str) -> GeminiEndpoint {
        GeminiEndpoint::new(Some(SecretString::from("test-key-not-real")), "gemini-test")
            .unwrap()
            .with_base_url(base_url)
    }

    /// Serve one canned HTTP response on a local port and return its base URL.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/v1beta")
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    fn sse_response(chunks: &[&str]) -> String {
        let mut body = String::new();
        for chunk in chunks {
            body.push_str(&format!("data: {chunk}\r\n\r\n"));
        }
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn test_endpoint_name_and_url() {
        let endpoint = endpoint("https://example.test/v1beta/");
        assert_eq!(endpoint.name(), "gemini");
        assert_eq!(
            endpoint.stream_url(),
            "https://example.test/v1beta/models/gemini-test:streamGenerateContent?alt=sse"
        );
    }

    #[tokio::test]
    async fn test_create_session_without_key_is_unavailable() {
        let endpoint = GeminiEndpoint::new(None, "gemini-test").unwrap();
        assert!(!endpoint.has_api_key());
        let err = endpoint
            .create_session(&[Message::system("p")])
            .await
            .unwrap_err();
        assert!(matches!(err, EndpointError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_create_session_snapshots_transcript() {
        let endpoint = endpoint("http://127.0.0.1:9");
        assert!(endpoint.has_api_key());
        let transcript = vec![Message::system("p"), Message::user("Hola")];
        let handle = endpoint.create_session(&transcript).await.unwrap();
        assert_eq!(handle.context(), transcript.as_slice());
    }

    #[tokio::test]
    async fn test_stream_yields_deltas_in_order() {
        let base_url = serve_once(sse_response(&[
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"¡Hola"}]}}]}"#,
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"! ¿Cómo estás?"}]},"finishReason":"STOP"}]}"#,
        ]))
        .await;
        let endpoint = endpoint(&base_url);
        let handle = endpoint
            .create_session(&[Message::system("p"), Message::user("Hola")])
            .await
            .unwrap();

        let deltas: Vec<_> = endpoint
            .stream_turn(&handle, "Hola", CancellationToken::new())
            .collect()
            .await;

        let texts: Vec<String> = deltas.into_iter().map(|d| d.unwrap()).collect();
        assert_eq!(texts, vec!["¡Hola", "! ¿Cómo estás?"]);
    }

    #[tokio::test]
    async fn test_stream_survives_pause_between_chunks() {
        let first = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Respira\"}]}}]}\r\n\r\n";
        let second = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\" hondo\"}]}}]}\r\n\r\n";
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                first.len() + second.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(first.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
            socket.write_all(second.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let endpoint = endpoint(&format!("http://{addr}/v1beta"));
        let handle = endpoint.create_session(&[Message::system("p")]).await.unwrap();
        let texts: Vec<String> = endpoint
            .stream_turn(&handle, "Hola", CancellationToken::new())
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(texts, vec!["Respira", " hondo"]);
    }

    #[tokio::test]
    async fn test_stream_429_is_rate_limited() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        let base_url = serve_once(format!(
            "HTTP/1.1 429 Too Many Requests\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ))
        .await;
        let endpoint = endpoint(&base_url);
        let handle = endpoint.create_session(&[Message::system("p")]).await.unwrap();

        let mut stream = endpoint.stream_turn(&handle, "Hola", CancellationToken::new());
        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(EndpointError::RateLimited { .. })));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_stream_ends_without_request() {
        let endpoint = endpoint("http://127.0.0.1:9");
        let handle = endpoint.create_session(&[Message::system("p")]).await.unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut stream = endpoint.stream_turn(&handle, "Hola", cancel);
        assert!(stream.next().await.is_none());
    }
}

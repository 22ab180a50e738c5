//! Gemini `generateContent` request and response types.
//!
//! Only the fields the chat session uses are modelled; unknown fields in
//! responses are ignored.

use serde::{Deserialize, Serialize};

use nia_types::chat::{ChatRole, Message};

/// Request body for `models/{model}:streamGenerateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerateContentRequest {
    /// Replay `context` and append `user_text` as the new user turn.
    ///
    /// The system message becomes `systemInstruction`. Empty `model`
    /// placeholders are skipped. `user_text` is not appended again when the
    /// replayed history already ends with it.
    pub fn replay(context: &[Message], user_text: &str) -> Self {
        let mut system_instruction = None;
        let mut contents = Vec::with_capacity(context.len() + 1);

        for message in context {
            match message.role {
                ChatRole::System => system_instruction = Some(Content::text(None, &message.content)),
                ChatRole::User => contents.push(Content::text(Some("user"), &message.content)),
                ChatRole::Model if message.content.is_empty() => {}
                ChatRole::Model => contents.push(Content::text(Some("model"), &message.content)),
            }
        }

        let already_asked = contents
            .last()
            .is_some_and(|c| c.role.as_deref() == Some("user") && c.joined_text() == user_text);
        if !already_asked {
            contents.push(Content::text(Some("user"), user_text));
        }

        Self {
            contents,
            system_instruction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    /// Concatenated text of all parts.
    pub fn joined_text(&self) -> String {
        self.parts.iter().filter_map(|p| p.text.as_deref()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One SSE chunk of a streamed response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, if it carries any.
    pub fn delta_text(&self) -> Option<String> {
        let text = self.candidates.first()?.content.as_ref()?.joined_text();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

impl ApiError {
    /// `RetryInfo.retryDelay` (e.g. `"7s"` or `"1.5s"`) in milliseconds.
    pub fn retry_after_ms(&self) -> Option<u64> {
        self.details.iter().find_map(|detail| {
            let delay = detail.get("retryDelay")?.as_str()?;
            let secs: f64 = delay.strip_suffix('s')?.parse().ok()?;
            Some((secs * 1000.0) as u64)
        })
    }
}

//! Request and error types shared by every completion backend

use serde::{Deserialize, Serialize};

/// One message of a chat-completions conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of a chat-completions request: `{model, messages}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    /// Content of the last user message, if any.
    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
    }
}

/// Why a single inference call produced no analysis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected API response structure: {0}")]
    MalformedResponse(String),
    #[error("admission gates are closed")]
    AdmissionClosed,
}

/// A chat-completions service.
///
/// Implementations perform exactly one request per call and never retry;
/// admission control happens before `complete` is reached.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send the request and return `choices[0].message.content`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError>;

    /// Get backend name
    fn name(&self) -> &str;
}

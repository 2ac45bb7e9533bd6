//! OpenRouter (OpenAI-compatible chat completions) backend

use crate::bridge::{CompletionBackend, CompletionRequest, InferenceError};
use codescope_core::config::InferenceSettings;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

pub struct OpenRouterBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenRouterBackend {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn from_settings(settings: &InferenceSettings) -> Result<Self, InferenceError> {
        Self::new(
            settings.endpoint.clone(),
            settings.api_key.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Pull `choices[0].message.content` out of a response body.
fn first_choice_content(body: &str) -> Result<String, InferenceError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| {
            InferenceError::MalformedResponse("missing choices[0].message.content".to_string())
        })
}

#[async_trait::async_trait]
impl CompletionBackend for OpenRouterBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, InferenceError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        if status != StatusCode::OK {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        first_choice_content(&body)
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

use async_trait::async_trait;
use tracing::debug;

use super::{dto::ChatResponse, ChatCompletion, ChatRequest};
use crate::{config::LlmConfig, error::AppError};

/// Client for any OpenAI-compatible chat-completion API (Groq by default).
#[derive(Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiCompatClient {
    pub fn new(http: reqwest::Client, config: LlmConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatCompletion for OpenAiCompatClient {
    fn ensure_configured(&self) -> Result<(), AppError> {
        self.config.api_key().map(|_| ())
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, AppError> {
        let api_key = self.config.api_key()?;

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("chat completion request failed: {e}")))?;

        // The provider reports errors in the body, so read it whatever the status.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("chat completion response unreadable: {e}")))?;

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            debug!(%status, error = %e, "chat completion response was not JSON");
            AppError::Upstream(format!("chat completion API returned {status}"))
        })?;

        parsed.into_content()
    }
}

use async_trait::async_trait;

use crate::error::AppError;

mod client;
mod dto;
pub mod sanitize;

pub use client::OpenAiCompatClient;
pub use dto::{ChatMessage, ChatRequest, ContentPart, ImageUrl};
#[cfg(test)]
pub use dto::{MessageContent, Role};

/// Sampling temperature shared by every prompt this service sends.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Fails with a configuration error when the provider credential is
    /// missing, without making a request.
    fn ensure_configured(&self) -> Result<(), AppError> {
        Ok(())
    }

    /// Sends one chat completion and returns the first choice's text.
    async fn complete(&self, request: ChatRequest) -> Result<String, AppError>;
}

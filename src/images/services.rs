use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use tracing::debug;

use crate::error::AppError;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug)]
pub struct FetchedImage {
    pub body: Bytes,
    pub content_type: String,
}

impl FetchedImage {
    /// Inline `data:` URL accepted by vision models in an `image_url` part.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.body)
        )
    }
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, AppError>;
}

#[derive(Clone)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, AppError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::ImageFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ImageFetch(format!("image URL returned {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(mime_essence)
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::ImageFetch(e.to_string()))?;

        debug!(
            bytes = body.len(),
            %content_type,
            declared_image = content_type.starts_with("image/"),
            "image fetched"
        );

        Ok(FetchedImage { body, content_type })
    }
}

/// `image/jpeg; charset=binary` -> `image/jpeg`
fn mime_essence(header: &str) -> Option<String> {
    let essence = header.split(';').next()?.trim().to_ascii_lowercase();
    (!essence.is_empty()).then_some(essence)
}

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TEXT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
}

impl LlmConfig {
    pub fn api_key(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .ok_or(AppError::Config("GROQ_API_KEY"))
    }
}

/// Connection details for the identity + storage service.
///
/// `anon_key` is only ever paired with the caller's own token, while
/// `service_role_key` is reserved for backend writes.
#[derive(Debug, Clone, Deserialize)]
pub struct DatastoreConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub service_role_key: Option<String>,
    pub database_url: Option<String>,
}

impl DatastoreConfig {
    pub fn url(&self) -> Result<&str, AppError> {
        self.url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .ok_or(AppError::Config("SUPABASE_URL"))
    }

    pub fn anon_key(&self) -> Result<&str, AppError> {
        self.anon_key
            .as_deref()
            .ok_or(AppError::Config("SUPABASE_ANON_KEY"))
    }

    pub fn service_role_key(&self) -> Result<&str, AppError> {
        self.service_role_key
            .as_deref()
            .ok_or(AppError::Config("SUPABASE_SERVICE_ROLE_KEY"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub llm: LlmConfig,
    pub datastore: DatastoreConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Secrets are optional here:
    /// a missing one fails the request that needs it, not the process.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("APP_PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid APP_PORT {p:?}: {e}"))?,
            None => 8080,
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            llm: LlmConfig {
                api_key: var("GROQ_API_KEY"),
                base_url: var("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.into()),
                text_model: var("LLM_TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.into()),
                vision_model: var("LLM_VISION_MODEL")
                    .unwrap_or_else(|| DEFAULT_VISION_MODEL.into()),
            },
            datastore: DatastoreConfig {
                url: var("SUPABASE_URL"),
                anon_key: var("SUPABASE_ANON_KEY"),
                service_role_key: var("SUPABASE_SERVICE_ROLE_KEY"),
                database_url: var("DATABASE_URL"),
            },
        })
    }
}

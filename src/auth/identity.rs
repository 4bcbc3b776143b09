use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::{config::DatastoreConfig, error::AppError};

/// Low-privilege access to the identity service: resolves a caller's own
/// token to a user id. It never writes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve_user(&self, token: &str) -> Result<Uuid, AppError>;
}

#[derive(Debug, Deserialize)]
struct AuthUserResponse {
    id: Uuid,
}

/// `GET /auth/v1/user` against a Supabase-style auth service, authenticated
/// with the anonymous key plus the caller's bearer token.
#[derive(Clone)]
pub struct SupabaseIdentity {
    http: reqwest::Client,
    config: DatastoreConfig,
}

impl SupabaseIdentity {
    pub fn new(http: reqwest::Client, config: DatastoreConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn resolve_user(&self, token: &str) -> Result<Uuid, AppError> {
        let url = format!("{}/auth/v1/user", self.config.url()?);
        let anon_key = self.config.anon_key()?;

        let response = self
            .http
            .get(&url)
            .header("apikey", anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                debug!(error = %e, "identity request failed");
                AppError::Unauthorized
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "identity service rejected token");
            return Err(AppError::Unauthorized);
        }

        let user: AuthUserResponse = response.json().await.map_err(|e| {
            debug!(error = %e, "identity response had no user id");
            AppError::Unauthorized
        })?;

        debug!(user_id = %user.id, "caller resolved");
        Ok(user.id)
    }
}

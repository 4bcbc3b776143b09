use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{config::DatastoreConfig, error::AppError, pantry::PantryRecord};

const PANTRY_TABLE: &str = "ingredients";

/// Elevated write access to the pantry table.
///
/// Implementations authenticate with backend credentials, never with the
/// caller's token; callers must pass records already scoped to a resolved
/// user id.
#[async_trait]
pub trait PantryStore: Send + Sync {
    async fn insert_items(&self, records: &[PantryRecord]) -> Result<(), AppError>;
}

/// Inserts through the datastore's REST interface with the service-role key.
#[derive(Clone)]
pub struct RestPantryStore {
    http: reqwest::Client,
    config: DatastoreConfig,
}

impl RestPantryStore {
    pub fn new(http: reqwest::Client, config: DatastoreConfig) -> Self {
        Self { http, config }
    }
}

#[derive(Debug, Deserialize)]
struct RestError {
    message: Option<String>,
}

#[async_trait]
impl PantryStore for RestPantryStore {
    async fn insert_items(&self, records: &[PantryRecord]) -> Result<(), AppError> {
        let url = format!("{}/rest/v1/{}", self.config.url()?, PANTRY_TABLE);
        let service_key = self.config.service_role_key()?;

        if records.is_empty() {
            return Ok(());
        }

        let response = self
            .http
            .post(&url)
            .header("apikey", service_key)
            .bearer_auth(service_key)
            .header("Prefer", "return=minimal")
            .json(records)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RestError>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("insert into {PANTRY_TABLE} failed with {status}"));
            debug!(%status, "pantry insert rejected");
            return Err(AppError::Storage(message));
        }

        debug!(rows = records.len(), "pantry rows inserted");
        Ok(())
    }
}

use crate::auth::{IdentityProvider, SupabaseIdentity};
use crate::config::AppConfig;
use crate::images::{HttpImageFetcher, ImageFetcher};
use crate::llm::{ChatCompletion, OpenAiCompatClient};
use crate::pantry::PgPantryStore;
use crate::storage::{PantryStore, RestPantryStore};
use anyhow::Context;
use std::sync::Arc;

/// Read-only per-process state shared by every request.
///
/// Identity resolution and pantry writes are separate capabilities: the
/// first only ever sees the caller's token, the second holds the backend
/// credential.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub llm: Arc<dyn ChatCompletion>,
    pub identity: Arc<dyn IdentityProvider>,
    pub images: Arc<dyn ImageFetcher>,
    pub pantry: Arc<dyn PantryStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;

        let pantry = match &config.datastore.database_url {
            Some(url) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }

                tracing::info!("pantry writes go to postgres");
                Arc::new(PgPantryStore::new(db)) as Arc<dyn PantryStore>
            }
            None => {
                tracing::info!("pantry writes go to the datastore REST API");
                Arc::new(RestPantryStore::new(http.clone(), config.datastore.clone()))
                    as Arc<dyn PantryStore>
            }
        };

        let llm = Arc::new(OpenAiCompatClient::new(http.clone(), config.llm.clone()));
        let identity = Arc::new(SupabaseIdentity::new(http.clone(), config.datastore.clone()));
        let images = Arc::new(HttpImageFetcher::new(http));

        if config.llm.api_key.is_none() {
            tracing::warn!("GROQ_API_KEY is not set; model requests will fail");
        }

        Ok(Self::from_parts(config, llm, identity, images, pantry))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        llm: Arc<dyn ChatCompletion>,
        identity: Arc<dyn IdentityProvider>,
        images: Arc<dyn ImageFetcher>,
        pantry: Arc<dyn PantryStore>,
    ) -> Self {
        Self {
            config,
            llm,
            identity,
            images,
            pantry,
        }
    }
}

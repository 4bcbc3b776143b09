//! Recording fakes for the capability traits, and request helpers for
//! driving the router in tests.

use std::io;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    app::build_app,
    auth::IdentityProvider,
    config::{AppConfig, DatastoreConfig, LlmConfig},
    error::AppError,
    images::{services::FetchedImage, ImageFetcher},
    llm::{ChatCompletion, ChatRequest},
    pantry::PantryRecord,
    state::AppState,
    storage::PantryStore,
};

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        llm: LlmConfig {
            api_key: Some("gsk_test".into()),
            base_url: "http://llm.invalid".into(),
            text_model: "text-model".into(),
            vision_model: "vision-model".into(),
        },
        datastore: DatastoreConfig {
            url: Some("http://datastore.invalid".into()),
            anon_key: Some("anon-key".into()),
            service_role_key: Some("service-key".into()),
            database_url: None,
        },
    }
}

pub enum Reply {
    Content(String),
    ProviderError(String),
}

pub struct FakeLlm {
    reply: Reply,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl FakeLlm {
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletion for FakeLlm {
    async fn complete(&self, request: ChatRequest) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Reply::Content(c) => Ok(c.clone()),
            Reply::ProviderError(m) => Err(AppError::Upstream(m.clone())),
        }
    }
}

pub struct FakeIdentity {
    pub user: Option<Uuid>,
    pub calls: AtomicUsize,
    pub tokens: Mutex<Vec<String>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn resolve_user(&self, token: &str) -> Result<Uuid, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.to_string());
        self.user.ok_or(AppError::Unauthorized)
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub calls: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageFetcher for FakeImages {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        Ok(FetchedImage {
            body: Bytes::from_static(b"fake-image"),
            content_type: "image/png".into(),
        })
    }
}

#[derive(Default)]
pub struct FakePantry {
    failure: Option<String>,
    pub calls: AtomicUsize,
    pub inserted: Mutex<Vec<PantryRecord>>,
}

#[async_trait]
impl PantryStore for FakePantry {
    async fn insert_items(&self, records: &[PantryRecord]) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(AppError::Storage(message.clone()));
        }
        self.inserted.lock().unwrap().extend_from_slice(records);
        Ok(())
    }
}

/// Log output written while a `capture_warnings` guard is held.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Records WARN and above on the current thread until the guard drops.
/// Use from a current-thread `#[tokio::test]`.
pub fn capture_warnings() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

/// Fakes plus the config they are wired with. `app()` builds a fresh router
/// sharing the same fakes, so call counts survive across requests.
pub struct Harness {
    pub config: AppConfig,
    pub llm: Arc<FakeLlm>,
    pub identity: Arc<FakeIdentity>,
    pub images: Arc<FakeImages>,
    pub pantry: Arc<FakePantry>,
}

impl Harness {
    fn with_reply(reply: Reply) -> Self {
        Self {
            config: test_config(),
            llm: Arc::new(FakeLlm {
                reply,
                requests: Mutex::new(Vec::new()),
            }),
            identity: Arc::new(FakeIdentity {
                user: Some(Uuid::new_v4()),
                calls: AtomicUsize::new(0),
                tokens: Mutex::new(Vec::new()),
            }),
            images: Arc::new(FakeImages::default()),
            pantry: Arc::new(FakePantry::default()),
        }
    }

    pub fn replying(content: &str) -> Self {
        Self::with_reply(Reply::Content(content.to_string()))
    }

    pub fn failing_upstream(message: &str) -> Self {
        Self::with_reply(Reply::ProviderError(message.to_string()))
    }

    pub fn with_anonymous_identity(mut self) -> Self {
        self.identity = Arc::new(FakeIdentity {
            user: None,
            calls: AtomicUsize::new(0),
            tokens: Mutex::new(Vec::new()),
        });
        self
    }

    pub fn with_failing_store(mut self, message: &str) -> Self {
        self.pantry = Arc::new(FakePantry {
            failure: Some(message.to_string()),
            ..FakePantry::default()
        });
        self
    }

    pub fn state(&self) -> AppState {
        AppState::from_parts(
            Arc::new(self.config.clone()),
            self.llm.clone(),
            self.identity.clone(),
            self.images.clone(),
            self.pantry.clone(),
        )
    }

    pub fn app(&self) -> Router {
        build_app(self.state())
    }

    /// Total calls made to any upstream collaborator.
    pub fn upstream_calls(&self) -> usize {
        self.llm.calls()
            + self.identity.calls.load(Ordering::SeqCst)
            + self.images.calls.load(Ordering::SeqCst)
            + self.pantry.calls.load(Ordering::SeqCst)
    }
}

pub fn post_json(path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Runs one request; an empty body comes back as `Value::Null`.
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Every failure a handler can produce.
///
/// All variants share one wire shape (`500 {"error": "<message>"}`); the
/// variant only decides the message text and the log level.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No authorization header")]
    MissingAuth,

    #[error("Invalid authorization header")]
    InvalidAuthScheme,

    /// The identity service rejected the caller's token.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    /// A secret needed for this request is not set in the environment.
    #[error("Missing {0}")]
    Config(&'static str),

    /// The LLM provider (or the network in front of it) reported an error.
    #[error("{0}")]
    Upstream(String),

    #[error("No content returned from the model")]
    EmptyCompletion,

    #[error("Model returned malformed output: {0}")]
    ResponseShape(String),

    #[error("Model output does not match the expected schema: {0}")]
    Schema(String),

    #[error("Failed to fetch image: {0}")]
    ImageFetch(String),

    #[error("{0}")]
    Storage(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::MissingAuth
            | AppError::InvalidAuthScheme
            | AppError::Unauthorized
            | AppError::Validation(_) => warn!(error = %self, "request rejected"),
            _ => error!(error = %self, "request failed"),
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// `Json` extractor whose rejection uses the `{error}` envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

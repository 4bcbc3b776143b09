use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;

/// The caller's bearer token, required on every non-preflight request.
///
/// Only presence and scheme are checked here; handlers that need a concrete
/// identity resolve the token through an `IdentityProvider`.
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AppError::MissingAuth)?;

        let value = header
            .to_str()
            .map_err(|_| AppError::InvalidAuthScheme)?
            .trim();
        if value.is_empty() {
            return Err(AppError::MissingAuth);
        }

        // Expect "Bearer <token>"
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::InvalidAuthScheme)?;

        Ok(BearerToken(token.to_string()))
    }
}

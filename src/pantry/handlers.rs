use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use super::dto::{ScanPantryRequest, ScanPantryResponse};
use super::services::{build_scan_request, parse_scanned_items, to_records};
use crate::{
    auth::BearerToken,
    error::AppError,
    state::AppState,
};

pub fn scan_routes() -> Router<AppState> {
    Router::new().route("/scan-pantry", post(scan_pantry))
}

/// Identity → body → image → vision model → parse → insert. Each step
/// needs the previous one to succeed; nothing is written unless the model
/// call and the parse both succeeded. The body is read raw and parsed only
/// once the caller is known.
#[instrument(skip_all)]
pub async fn scan_pantry(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Bytes,
) -> Result<Json<ScanPantryResponse>, AppError> {
    let user_id = state.identity.resolve_user(&token).await?;

    let payload: ScanPantryRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;
    let image_url = payload.image_url()?;
    state.llm.ensure_configured()?;

    let image = state.images.fetch(image_url).await?;
    debug!(%user_id, bytes = image.body.len(), content_type = %image.content_type, "scanning image");

    let request = build_scan_request(&state.config.llm.vision_model, image.to_data_url());
    let content = state.llm.complete(request).await?;

    let items = parse_scanned_items(&content)?;
    let records = to_records(user_id, items, OffsetDateTime::now_utc());

    state.pantry.insert_items(&records).await?;

    info!(%user_id, items = records.len(), "pantry scan stored");
    Ok(Json(ScanPantryResponse {
        success: true,
        items: records,
    }))
}

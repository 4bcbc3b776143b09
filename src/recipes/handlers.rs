use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;
use tracing::{info, instrument};

use super::dto::{AskRecipeRequest, AskRecipeResponse, GenerateRecipeRequest};
use super::services::{
    build_generation_request, build_question_request, parse_generated_recipe, recipe_title,
};
use crate::{
    auth::BearerToken,
    error::{AppError, AppJson},
    state::AppState,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/ask-recipe", post(ask_recipe))
        .route("/generate-recipe", post(generate_recipe))
}

#[instrument(skip_all)]
pub async fn ask_recipe(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    AppJson(payload): AppJson<AskRecipeRequest>,
) -> Result<Json<AskRecipeResponse>, AppError> {
    let (question, recipe) = payload.validate()?;

    let request = build_question_request(&state.config.llm.text_model, &recipe, question);
    let answer = state.llm.complete(request).await?;

    info!(
        recipe = %recipe_title(&recipe),
        answer_len = answer.len(),
        "recipe question answered"
    );
    Ok(Json(AskRecipeResponse { answer }))
}

#[instrument(skip_all)]
pub async fn generate_recipe(
    State(state): State<AppState>,
    BearerToken(_token): BearerToken,
    AppJson(payload): AppJson<GenerateRecipeRequest>,
) -> Result<Json<Value>, AppError> {
    let ingredients = payload.validate()?;

    let request = build_generation_request(&state.config.llm.text_model, &ingredients);
    let content = state.llm.complete(request).await?;
    let recipe = parse_generated_recipe(&content)?;

    info!(ingredients = ingredients.len(), "recipe generated");
    Ok(Json(recipe))
}

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::dto::{GeneratedRecipe, RecipeContext};
use crate::error::AppError;
use crate::llm::{sanitize, ChatMessage, ChatRequest, DEFAULT_TEMPERATURE};

const NOT_SPECIFIED: &str = "Not specified";

/// Token cap for answers to recipe questions.
pub const ANSWER_MAX_TOKENS: u32 = 500;

const ASSISTANT_PERSONA: &str = "You are a helpful and friendly cooking assistant. You help users with questions about cooking recipes.
Be concise but thorough in your answers. Provide practical tips and suggestions.
If asked about substitutions, consider dietary restrictions and what might be commonly available.
If asked about technique, be specific and helpful for beginners.";

/// Renders a client-supplied field. Strings go in as-is, other JSON as text.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders the recipe as the fixed text block embedded in the system prompt.
pub fn recipe_context(recipe: &RecipeContext) -> String {
    let text = |v: &Option<Value>| match v {
        None | Some(Value::Null) => NOT_SPECIFIED.to_string(),
        Some(Value::String(s)) if s.is_empty() => NOT_SPECIFIED.to_string(),
        Some(other) => render(other),
    };

    let list = |v: &Option<Value>| match v {
        Some(Value::Array(items)) if !items.is_empty() => Some(items.iter().map(render).collect::<Vec<_>>()),
        _ => None,
    };

    let ingredients = list(&recipe.ingredients)
        .map(|items| items.join(", "))
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());

    let instructions = list(&recipe.instructions)
        .map(|steps| {
            steps
                .iter()
                .enumerate()
                .map(|(i, step)| format!("{}. {}", i + 1, step))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());

    format!(
        "Recipe: {}\nDescription: {}\nCooking Time: {}\nIngredients: {}\nInstructions: {}",
        text(&recipe.title),
        text(&recipe.description),
        text(&recipe.cooking_time),
        ingredients,
        instructions,
    )
}

/// Title for log lines.
pub fn recipe_title(recipe: &RecipeContext) -> String {
    recipe.title.as_ref().map(render).unwrap_or_default()
}

pub fn build_question_request(model: &str, recipe: &RecipeContext, question: &str) -> ChatRequest {
    let system = format!(
        "{ASSISTANT_PERSONA}\n\nHere is the recipe the user is asking about:\n\n{}",
        recipe_context(recipe)
    );

    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::system(system), ChatMessage::user(question)],
        temperature: DEFAULT_TEMPERATURE,
        max_tokens: Some(ANSWER_MAX_TOKENS),
    }
}

pub fn build_generation_request(model: &str, ingredients: &[String]) -> ChatRequest {
    let prompt = format!(
        "You are a helpful chef. Generate a recipe based on these ingredients: {}.
Return strictly valid JSON (no markdown formatting, no backticks) with this schema:
{{ \"title\": \"Recipe Name\", \"description\": \"Brief description\", \"ingredients\": [\"List of ingredients with quantities\"], \"instructions\": [\"Step 1\", \"Step 2\"], \"cooking_time\": \"Time in minutes\" }}",
        ingredients.join(", ")
    );

    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user(prompt)],
        temperature: DEFAULT_TEMPERATURE,
        max_tokens: None,
    }
}

/// Parses the model's recipe and checks it against the requested schema.
/// Returns the parsed value untouched, extra keys included.
pub fn parse_generated_recipe(content: &str) -> Result<Value, AppError> {
    let value = sanitize::parse_model_json(content)?;

    let recipe =
        GeneratedRecipe::deserialize(&value).map_err(|e| AppError::Schema(e.to_string()))?;
    if !recipe.has_valid_cooking_time() {
        return Err(AppError::Schema(
            "cooking_time must be a string or a number".into(),
        ));
    }
    debug!(
        title = %recipe.title,
        has_description = recipe.description.is_some(),
        ingredients = recipe.ingredients.len(),
        steps = recipe.instructions.len(),
        "recipe generated"
    );

    Ok(value)
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// The recipe a question is about, as the client app holds it. Fields
/// are kept as raw JSON: only the title is checked, everything else is
/// rendered as best it can be.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeContext {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(rename = "cookingTime", default)]
    pub cooking_time: Option<Value>,
    #[serde(default)]
    pub ingredients: Option<Value>,
    #[serde(default)]
    pub instructions: Option<Value>,
}

/// Request body for `POST /ask-recipe`.
#[derive(Debug, Deserialize)]
pub struct AskRecipeRequest {
    #[serde(default)]
    pub question: Option<Value>,
    #[serde(default)]
    pub recipe: Option<Value>,
}

impl AskRecipeRequest {
    pub fn validate(&self) -> Result<(&str, RecipeContext), AppError> {
        let question = match &self.question {
            Some(Value::String(q)) if !q.is_empty() => q.as_str(),
            _ => return Err(AppError::Validation("No question provided".into())),
        };

        let no_recipe = || AppError::Validation("No recipe provided".into());
        let recipe = match &self.recipe {
            Some(value @ Value::Object(fields)) if fields.get("title").is_some_and(is_truthy) => {
                RecipeContext::deserialize(value).map_err(|_| no_recipe())?
            }
            _ => return Err(no_recipe()),
        };

        Ok((question, recipe))
    }
}

/// JSON truthiness: null, false, 0 and "" are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Serialize)]
pub struct AskRecipeResponse {
    pub answer: String,
}

/// Request body for `POST /generate-recipe`.
#[derive(Debug, Deserialize)]
pub struct GenerateRecipeRequest {
    #[serde(default)]
    pub ingredients: Option<Value>,
}

impl GenerateRecipeRequest {
    pub fn validate(&self) -> Result<Vec<String>, AppError> {
        let items = match &self.ingredients {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => return Err(AppError::Validation("No ingredients provided".into())),
        };

        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(AppError::Validation("Ingredients must be strings".into())),
            })
            .collect()
    }
}

/// The shape the generation prompt asks for. Only used to check the
/// model's reply; the reply itself is returned as parsed.
#[derive(Debug, Deserialize)]
pub struct GeneratedRecipe {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Free text or a number of minutes; checked by `has_valid_cooking_time`.
    #[serde(default)]
    pub cooking_time: Option<Value>,
}

impl GeneratedRecipe {
    pub fn has_valid_cooking_time(&self) -> bool {
        matches!(
            self.cooking_time,
            None | Some(Value::Null) | Some(Value::String(_)) | Some(Value::Number(_))
        )
    }
}

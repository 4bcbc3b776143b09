use serde_json::Value;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::dto::ScannedItem;
use super::repo_types::PantryRecord;
use crate::error::AppError;
use crate::llm::{sanitize, ChatMessage, ChatRequest, ContentPart, ImageUrl, DEFAULT_TEMPERATURE};

/// Used when the model omits `days_to_expire` or reports 0.
pub const DEFAULT_SHELF_LIFE_DAYS: i64 = 7;

/// Upper bound on a model-reported shelf life, in either direction.
const MAX_SHELF_LIFE_DAYS: f64 = 36_500.0;

const SCAN_INSTRUCTIONS: &str = "Identify the food items in this image.
For each item, estimate a safe shelf life in days from today (conservative estimate).
Return strictly valid JSON array (no markdown) with this schema:
[ { \"name\": \"Milk\", \"days_to_expire\": 7 }, ... ]";

pub fn build_scan_request(model: &str, image_data_url: String) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: SCAN_INSTRUCTIONS.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image_data_url,
                },
            },
        ])],
        temperature: DEFAULT_TEMPERATURE,
        max_tokens: None,
    }
}

/// Parses the model reply into items. The top level must be an array and
/// each element must carry a string `name`.
pub fn parse_scanned_items(content: &str) -> Result<Vec<ScannedItem>, AppError> {
    let Value::Array(entries) = sanitize::parse_model_json(content)? else {
        return Err(AppError::ResponseShape(
            "expected a JSON array of items".into(),
        ));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            serde_json::from_value::<ScannedItem>(entry)
                .map_err(|e| AppError::Schema(format!("item {i}: {e}")))
        })
        .collect()
}

impl ScannedItem {
    pub fn shelf_life_days(&self) -> i64 {
        match self.days_to_expire {
            Some(days) if days.is_finite() && days != 0.0 => {
                days.trunc().clamp(-MAX_SHELF_LIFE_DAYS, MAX_SHELF_LIFE_DAYS) as i64
            }
            _ => DEFAULT_SHELF_LIFE_DAYS,
        }
    }
}

pub fn to_records(user_id: Uuid, items: Vec<ScannedItem>, now: OffsetDateTime) -> Vec<PantryRecord> {
    items
        .into_iter()
        .map(|item| {
            let expiry_date = now + Duration::days(item.shelf_life_days());
            PantryRecord {
                user_id,
                name: item.name,
                expiry_date,
            }
        })
        .collect()
}

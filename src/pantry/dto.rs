use serde::{Deserialize, Serialize};

use super::repo_types::PantryRecord;
use crate::error::AppError;

/// Request body for `POST /scan-pantry`.
#[derive(Debug, Deserialize)]
pub struct ScanPantryRequest {
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

impl ScanPantryRequest {
    pub fn image_url(&self) -> Result<&str, AppError> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::Validation("No imageUrl provided".into()))
    }
}

#[derive(Debug, Serialize)]
pub struct ScanPantryResponse {
    pub success: bool,
    pub items: Vec<PantryRecord>,
}

/// One element of the vision model's JSON array.
#[derive(Debug, Deserialize)]
pub struct ScannedItem {
    pub name: String,
    #[serde(default)]
    pub days_to_expire: Option<f64>,
}

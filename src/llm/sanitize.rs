use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::error::AppError;

/// Removes markdown code-fence markers that models add around JSON even
/// when told not to. Idempotent; clean input comes back trimmed only.
pub fn strip_code_fences(raw: &str) -> String {
    lazy_static! {
        static ref FENCE_RE: Regex = Regex::new(r"(?i)```(?:json)?").unwrap();
    }
    FENCE_RE.replace_all(raw, "").trim().to_string()
}

/// Strips fences and parses what is left. No fallback on failure.
pub fn parse_model_json(raw: &str) -> Result<Value, AppError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned).map_err(|e| AppError::ResponseShape(e.to_string()))
}

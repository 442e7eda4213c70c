use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload must be a JSON array of records, got {found}")]
    NotAnArray { found: &'static str },
    #[error("record {index} must be an object with exactly one key, got {keys} keys")]
    InvalidRecord { index: usize, keys: usize },
}

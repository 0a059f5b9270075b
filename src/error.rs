// Error types module

use thiserror::Error;

use crate::image_transform::ImageError;

/// Crate-level error covering configuration, I/O and image failures
#[derive(Error, Debug)]
pub enum MediaError {
    /// Configuration errors (invalid YAML, missing env vars, unknown source)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Row parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl MediaError {
    /// HTTP status the host should answer with
    pub fn to_http_status(&self) -> u16 {
        match self {
            MediaError::Image(e) => e.to_http_status(),
            MediaError::Json(_) => 400,
            MediaError::Config(_) | MediaError::Io(_) => 500,
        }
    }
}

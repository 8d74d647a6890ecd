use pageforge_document::LegacyError;
use thiserror::Error;

/// Common error type that can hold any pageforge error
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Legacy decode error: {0}")]
    Legacy(#[from] LegacyError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl From<String> for CommonError {
    fn from(s: String) -> Self {
        CommonError::Generic(s)
    }
}

impl From<&str> for CommonError {
    fn from(s: &str) -> Self {
        CommonError::Generic(s.to_string())
    }
}

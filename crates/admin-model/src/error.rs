use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// A struct field received text that is not valid JSON.
    #[error("field {field}: invalid JSON: {message}")]
    InvalidJson { field: String, message: String },
    #[error("metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

use rules::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Engine error: {0}")]
    EngineError(#[from] EngineError),

    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid session file: {0}")]
    FieldError(#[from] validator::ValidationErrors),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown entry key: '{0}'")]
    UnknownEntryKey(String),
}

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CardflowError {
    DatabaseError(String),
    StorageError(String),
    RenderError(String),
    IngestError(String),
    ValidationError(String),
    ConfigurationError(String),
}

impl fmt::Display for CardflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardflowError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            CardflowError::StorageError(msg) => write!(f, "Storage error: {msg}"),
            CardflowError::RenderError(msg) => write!(f, "Render error: {msg}"),
            CardflowError::IngestError(msg) => write!(f, "Ingest error: {msg}"),
            CardflowError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            CardflowError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for CardflowError {}

pub type Result<T> = std::result::Result<T, CardflowError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// Malformed JSONL input; `line` is the 1-based physical line number
    #[error("Format error at line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("Absolute path not allowed: {0}")]
    AbsolutePath(String),

    #[error("Duplicate item: {0}")]
    DuplicateItem(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LibraryError {
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "DatasetItem".to_string(),
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;

//! Error types for the query engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Adapter error in '{source_name}': {message}")]
    Adapter { source_name: String, message: String },

    #[error("no content source")]
    NoContentSource,

    #[error("Render error: {message}")]
    Render { message: String },
}

pub type Result<T> = std::result::Result<T, QueryError>;

impl QueryError {
    pub fn adapter(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Adapter {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

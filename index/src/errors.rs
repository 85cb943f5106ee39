use thiserror::Error;

/// Errors from index construction, querying and caching
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Document Error: {0}")]
    DocumentError(String),

    #[error("Cache Error: {0}")]
    CacheError(String),

    #[error(transparent)]
    Core(#[from] socratic_core::CoreError),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Named cache does not exist
    #[error("Cache not found: {0}")]
    CacheNotFound(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Stored row could not be turned back into a value
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StorageError> for mlc_core::SoundboardError {
    fn from(err: StorageError) -> Self {
        mlc_core::SoundboardError::storage(err.to_string())
    }
}

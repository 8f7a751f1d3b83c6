/// Core error types for the MLC soundboard
use thiserror::Error;

/// Result type alias using `SoundboardError`
pub type Result<T> = std::result::Result<T, SoundboardError>;

/// Core error type for the MLC soundboard
#[derive(Error, Debug)]
pub enum SoundboardError {
    /// Persistent store errors (key-value store, asset cache backend)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Transport-level failures (connect, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// Remote answered with a non-success status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Manifest body could not be understood
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Audio handle creation or playback errors
    #[error("Audio error: {0}")]
    Audio(String),

    /// Offline asset cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Malformed or unsupported URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SoundboardError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an audio error
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Create a cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a server error from a status code and response text
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }
}

impl From<url::ParseError> for SoundboardError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

//! Worker error types.

use mlc_core::SoundboardError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// A precache entry could not be fetched; nothing was written
    #[error("Install failed for {url}: {reason}")]
    Install { url: String, reason: String },

    /// Cache miss and the network request failed
    #[error("Network error: {0}")]
    Network(String),

    /// Cache backend failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// Request could not be turned into an asset URL
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl WorkerError {
    pub fn install(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Install {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<SoundboardError> for WorkerError {
    fn from(err: SoundboardError) -> Self {
        match err {
            SoundboardError::Network(msg) => WorkerError::Network(msg),
            SoundboardError::ServerError { status, message } => {
                WorkerError::Network(format!("upstream returned {}: {}", status, message))
            }
            SoundboardError::InvalidUrl(msg) => WorkerError::BadRequest(msg),
            other => WorkerError::Cache(other.to_string()),
        }
    }
}

impl From<url::ParseError> for WorkerError {
    fn from(err: url::ParseError) -> Self {
        WorkerError::BadRequest(err.to_string())
    }
}

//! Error types for the blob store client.

use thiserror::Error;

/// Errors that can occur when talking to the blob store.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Invalid base URL
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ClientError> for mlc_core::SoundboardError {
    fn from(err: ClientError) -> Self {
        use mlc_core::SoundboardError;

        match err {
            ClientError::ServerError { status, message } => {
                SoundboardError::server(status, message)
            }
            ClientError::InvalidUrl(msg) => SoundboardError::InvalidUrl(msg),
            ClientError::ParseError(msg) => SoundboardError::Manifest(msg),
            ClientError::ServerUnreachable(msg) => SoundboardError::network(msg),
            ClientError::Request(e) => SoundboardError::network(e.to_string()),
        }
    }
}

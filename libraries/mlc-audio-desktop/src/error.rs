/// Desktop audio errors
use thiserror::Error;

/// Result type for desktop audio operations
pub type Result<T> = std::result::Result<T, DesktopAudioError>;

#[derive(Debug, Error)]
pub enum DesktopAudioError {
    /// No default output device
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuildError(String),

    /// Failed to play stream
    #[error("Failed to play stream: {0}")]
    PlayError(String),

    /// Device only offers sample formats the mixer does not produce
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Clip bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Clip bytes could not be downloaded
    #[error("Failed to fetch clip: {0}")]
    Fetch(#[from] mlc_client::ClientError),

    /// Source address is not a URL
    #[error("Invalid clip URL: {0}")]
    InvalidUrl(String),

    /// The audio thread has exited
    #[error("Audio thread is not running")]
    ThreadGone,
}

impl From<cpal::BuildStreamError> for DesktopAudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        DesktopAudioError::StreamBuildError(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for DesktopAudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        DesktopAudioError::PlayError(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for DesktopAudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        DesktopAudioError::StreamBuildError(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for DesktopAudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        DesktopAudioError::Decode(err.to_string())
    }
}

impl From<DesktopAudioError> for mlc_core::SoundboardError {
    fn from(err: DesktopAudioError) -> Self {
        match err {
            DesktopAudioError::Fetch(client) => client.into(),
            DesktopAudioError::InvalidUrl(url) => mlc_core::SoundboardError::InvalidUrl(url),
            other => mlc_core::SoundboardError::audio(other.to_string()),
        }
    }
}

//! MLC Soundboard - Desktop Audio
//!
//! Plays soundboard clips on the default output device.
//!
//! - **Output**: CPAL stream owned by a dedicated audio thread
//! - **Decoding**: Symphonia, whole clip at once
//! - **Resampling**: Rubato sinc resampling to the device rate
//!
//! # Example
//!
//! ```rust,no_run
//! use mlc_audio_desktop::DesktopAudioBackend;
//! use mlc_client::{BlobStoreConfig, ManifestClient};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ManifestClient::new(BlobStoreConfig::default())?);
//! let (events, _receiver) = tokio::sync::mpsc::unbounded_channel();
//! let backend = DesktopAudioBackend::new(client, events)?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod backend;
mod decode;
mod error;
mod output;

pub use backend::{DesktopAudioBackend, DesktopHandle};
pub use decode::{convert_for_device, decode_clip, extension_hint, DecodedClip};
pub use error::{DesktopAudioError, Result};
pub use output::{DeviceLayout, OutputEngine, Voice};

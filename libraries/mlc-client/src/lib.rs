//! MLC Soundboard Client
//!
//! HTTP client for the blob store that hosts the sound manifest and clips.
//!
//! # Features
//!
//! - **Manifest sync**: fetch `{base_url}/{file_name}` and keep the raw body
//! - **Clip download**: fetch `{base_url}/{path}` bytes for audio backends
//!
//! # Example
//!
//! ```ignore
//! use mlc_client::{BlobStoreConfig, ManifestClient};
//! use mlc_core::ManifestSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BlobStoreConfig::new(
//!         "https://mountainlaircamp.blob.core.windows.net/mlc-soundbank/",
//!         "MLCSoundBank.json",
//!     );
//!     let client = ManifestClient::new(config)?;
//!
//!     let manifest = client.fetch_manifest().await?;
//!     println!("Found {} sounds", manifest.sounds.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::ManifestClient;
pub use error::{ClientError, Result};
pub use types::{BlobStoreConfig, DEFAULT_BASE_URL, DEFAULT_MANIFEST_FILE};

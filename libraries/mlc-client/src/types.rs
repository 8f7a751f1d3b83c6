//! Configuration types for the blob store client.

use serde::{Deserialize, Serialize};

/// Default blob store container holding the sound bank.
pub const DEFAULT_BASE_URL: &str = "https://mountainlaircamp.blob.core.windows.net/mlc-soundbank/";

/// Default manifest file name inside the container.
pub const DEFAULT_MANIFEST_FILE: &str = "MLCSoundBank.json";

/// Where the manifest and clips live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobStoreConfig {
    /// Container URL (e.g., "https://account.blob.core.windows.net/bank/")
    pub base_url: String,
    /// Manifest file name relative to `base_url`
    pub manifest_file: String,
}

impl BlobStoreConfig {
    /// Create a config for a container and manifest file.
    pub fn new(base_url: impl Into<String>, manifest_file: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            manifest_file: manifest_file.into(),
        }
    }
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MANIFEST_FILE)
    }
}

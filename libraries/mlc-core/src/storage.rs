//! Key-value persistence used by the controller

use crate::error::Result;
use async_trait::async_trait;

/// Key under which the raw manifest snapshot is persisted
pub const SOUND_MAP_KEY: &str = "soundMap";

/// String key-value store
///
/// Stands in for browser local storage: values are opaque strings, writes
/// replace the previous value, and there is no eviction.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `Ok(None)` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write (or overwrite) a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

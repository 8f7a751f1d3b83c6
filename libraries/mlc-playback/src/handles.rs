//! Lazily-populated audio handle cache
//!
//! Maps a descriptor path to its audio handle. Entries are created the first
//! time a path is referenced (preload or first play) and live for the rest of
//! the session.

use mlc_core::{AudioBackend, AudioHandle, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Path-keyed audio handles
#[derive(Default)]
pub struct AudioHandleCache {
    handles: HashMap<String, Arc<dyn AudioHandle>>,
}

impl AudioHandleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for a path, if one was registered
    pub fn get(&self, path: &str) -> Option<Arc<dyn AudioHandle>> {
        self.handles.get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.handles.contains_key(path)
    }

    /// Register a handle; an existing handle for the path is kept
    pub fn insert(&mut self, path: impl Into<String>, handle: Arc<dyn AudioHandle>) {
        self.handles.entry(path.into()).or_insert(handle);
    }

    /// Get the handle for `path`, creating it from `source_url` if missing
    pub async fn resolve(
        &mut self,
        backend: &dyn AudioBackend,
        path: &str,
        source_url: &str,
    ) -> Result<Arc<dyn AudioHandle>> {
        if let Some(handle) = self.get(path) {
            return Ok(handle);
        }

        let handle = backend.create_handle(source_url).await?;
        debug!(path = %path, handle = %handle.id(), "Created audio handle on demand");
        self.handles.insert(path.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl std::fmt::Debug for AudioHandleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioHandleCache")
            .field("paths", &self.handles.keys().collect::<Vec<_>>())
            .finish()
    }
}

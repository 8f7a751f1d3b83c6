//! Result and token types for controller operations

use serde::{Deserialize, Serialize};

/// Message shown when the persisted snapshot cannot be read
pub const CACHE_LOAD_ERROR: &str = "Error loading sounds from cache";

/// Message shown when a sync fails
pub const SYNC_ERROR: &str = "Error syncing with server";

/// Message shown when a clip cannot start
pub const PLAYBACK_ERROR: &str = "Error playing audio";

/// Token issued by `begin_sync`
///
/// Only the most recently issued ticket may apply its result; results carried
/// by older tickets are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SyncTicket {
    generation: u64,
}

impl SyncTicket {
    pub(crate) fn new(generation: u64) -> Self {
        Self { generation }
    }

    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Outcome of a sync that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncReport {
    /// The manifest replaced the catalog
    Applied {
        /// Number of sounds in the new catalog
        sounds: usize,
        /// Preload results for the new catalog
        preload: PreloadReport,
    },

    /// A newer sync started before this one finished; nothing was changed
    Superseded,
}

/// Counts from one preload pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadReport {
    /// Descriptors considered
    pub total: usize,
    /// Handles created in this pass
    pub registered: usize,
    /// Handles that already existed and were reused
    pub reused: usize,
    /// Registrations that failed and were skipped
    pub failed: usize,
}

impl PreloadReport {
    /// Descriptors that have a usable handle after the pass
    pub fn usable(&self) -> usize {
        self.registered + self.reused
    }
}

/// How `load_from_cache` produced the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheLoad {
    /// The persisted snapshot was rendered
    Restored {
        /// Number of sounds restored
        sounds: usize,
    },

    /// No snapshot existed, so a full sync ran
    Synced(SyncReport),
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleOutcome {
    /// The clip started and now owns the slot
    Started,
    /// The clip was already playing and has been stopped
    Stopped,
}

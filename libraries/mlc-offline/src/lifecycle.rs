//! Worker lifecycle and control messages

use serde::{Deserialize, Serialize};

/// Lifecycle of one worker version
///
/// ```text
/// Parsed -> Installing -> Installed (waiting) -> Activating -> Activated
///              |
///              +-> Redundant (install failed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    /// Installed and waiting for clients of the previous version to go away
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerState {
    pub fn is_waiting(self) -> bool {
        self == Self::Installed
    }
}

/// Message posted to the worker's control channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum WorkerMessage {
    /// Activate now instead of waiting
    #[serde(rename = "skipWaiting")]
    SkipWaiting,

    /// Any other action; ignored
    #[serde(other)]
    Unknown,
}

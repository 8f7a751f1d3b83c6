/// Collaborator traits for the soundboard controller
use crate::error::Result;
use crate::types::Manifest;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Remote manifest provider
///
/// Implementers fetch the manifest and know how to turn a descriptor path into
/// a fetchable address on the same blob store.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetch the current manifest
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-success status, or a body
    /// that is not a manifest
    async fn fetch_manifest(&self) -> Result<Manifest>;

    /// Absolute address of a sound resource
    fn resource_url(&self, path: &str) -> String;
}

// ============================================================================
// Audio
// ============================================================================

/// Identity of an audio handle, stable for the handle's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle-{}", self.0)
    }
}

/// Identity of one start of playback
///
/// Every successful `play` yields a fresh id, so events from an earlier play
/// of the same handle can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayId(u64);

impl PlayId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "play-{}", self.0)
    }
}

/// Events emitted by an audio backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// Playback reached the end of the clip
    Ended {
        /// Handle that finished
        handle: HandleId,
        /// Play that finished
        play: PlayId,
    },

    /// Playback failed after it had started
    Failed {
        /// Handle that failed
        handle: HandleId,
        /// Play that failed
        play: PlayId,
        /// Error message
        message: String,
    },
}

impl AudioEvent {
    pub fn handle(&self) -> HandleId {
        match self {
            Self::Ended { handle, .. } | Self::Failed { handle, .. } => *handle,
        }
    }

    pub fn play(&self) -> PlayId {
        match self {
            Self::Ended { play, .. } | Self::Failed { play, .. } => *play,
        }
    }
}

/// Sending half of the audio event channel, held by backends
pub type AudioEventSender = tokio::sync::mpsc::UnboundedSender<AudioEvent>;

/// Receiving half of the audio event channel, drained by the application loop
pub type AudioEventReceiver = tokio::sync::mpsc::UnboundedReceiver<AudioEvent>;

/// A lazily-bound reference to a playable clip
///
/// Creating a handle only records its source; bytes are fetched when playback
/// first starts.
#[async_trait]
pub trait AudioHandle: Send + Sync {
    /// Handle identity, carried by emitted events
    fn id(&self) -> HandleId;

    /// Source address the handle plays from
    fn source(&self) -> &str;

    /// Start playback from the current position
    ///
    /// Resolves once playback has actually begun, with the id that events
    /// for this play will carry.
    ///
    /// # Errors
    /// Returns an error if the clip cannot be fetched, decoded, or output
    async fn play(&self) -> Result<PlayId>;

    /// Pause playback, keeping the position
    fn pause(&self);

    /// Move the position back to the start of the clip
    fn rewind(&self);

    /// Whether audio is currently being output
    fn is_playing(&self) -> bool;
}

/// Factory for audio handles
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Register a handle for a source address without fetching audio data
    ///
    /// # Errors
    /// Returns an error if the address cannot be used as an audio source
    async fn create_handle(&self, source_url: &str) -> Result<Arc<dyn AudioHandle>>;
}

// ============================================================================
// Rendering
// ============================================================================

/// Identity of one rendered row
///
/// Rows are rebuilt on every render, so the render generation is part of the
/// identity: a row from an earlier render never equals a row from a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHandle {
    generation: u64,
    index: usize,
}

impl RowHandle {
    pub fn new(generation: u64, index: usize) -> Self {
        Self { generation, index }
    }

    /// Render generation the row belongs to
    pub fn generation(self) -> u64 {
        self.generation
    }

    /// Display position within its render
    pub fn index(self) -> usize {
        self.index
    }
}

/// Data for one interactive row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundRow {
    pub handle: RowHandle,
    pub name: String,
    pub attribution: Option<String>,
    pub path: String,
}

/// Display layer driven by the controller
pub trait SoundboardView: Send {
    /// Replace every row with the given ones (already sorted)
    fn render(&mut self, rows: &[SoundRow]);

    /// Switch a row between its playing and idle visuals
    ///
    /// Rows from an earlier render may be passed; implementations ignore them.
    fn set_playing(&mut self, row: RowHandle, playing: bool);

    /// Show or hide the loading indicator
    fn show_loading(&mut self, visible: bool);

    /// Coarse preload progress
    fn show_progress(&mut self, loaded: usize, total: usize);

    /// Show the error banner
    fn show_error(&mut self, message: &str);

    /// Hide the error banner
    fn hide_error(&mut self);
}

//! MLC Soundboard - Playback Controller
//!
//! Keeps the local catalog in step with the remote manifest and plays at most
//! one clip at a time.
//!
//! This crate provides:
//! - Startup from the persisted manifest snapshot, or a full sync without one
//! - Manifest sync with generation tickets, so stale results are dropped
//! - Concurrent, all-settled preloading of audio handles
//! - Toggle semantics for rows: tap to play, tap again to stop
//! - Natural end-of-clip handling via backend events
//!
//! # Architecture
//!
//! `mlc-playback` is platform-agnostic. Persistence, the manifest source,
//! audio output, and the display are all provided through the traits in
//! `mlc-core`, so the controller runs the same against `SQLite` and `cpal` as
//! it does against in-memory fakes.
//!
//! # Example
//!
//! ```rust,ignore
//! use mlc_playback::{ControllerServices, SoundboardController};
//!
//! let services = ControllerServices { store, source, audio };
//! let mut controller = SoundboardController::new(services, Box::new(view));
//!
//! controller.load_from_cache().await?;
//! controller.sync().await?;
//!
//! while let Some(event) = audio_events.recv().await {
//!     controller.handle_audio_event(event);
//! }
//! ```

#![forbid(unsafe_code)]

mod controller;
mod handles;
mod slot;
mod types;

pub use controller::{ControllerServices, SoundboardController};
pub use handles::AudioHandleCache;
pub use slot::PlaybackSlot;
pub use types::{
    CacheLoad, PreloadReport, SyncReport, SyncTicket, ToggleOutcome, CACHE_LOAD_ERROR,
    PLAYBACK_ERROR, SYNC_ERROR,
};

//! MLC Soundboard Core
//!
//! Platform-agnostic types, collaborator traits, and error handling shared by
//! every crate in the workspace.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `SoundDescriptor`, `SoundCatalog`, `Manifest`
//! - **Controller Collaborators**: `KeyValueStore`, `ManifestSource`,
//!   `AudioBackend`/`AudioHandle`, `SoundboardView`
//! - **Worker Collaborators**: `CacheStorage`, `Network`
//! - **Error Handling**: Unified `SoundboardError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use mlc_core::{Manifest, SoundCatalog};
//!
//! let body = r#"[
//!     {"Name": "Airhorn", "Path": "airhorn.mp3", "Tags": ["Dave"], "SortOrder": 2},
//!     {"Name": "Gong", "Path": "gong.mp3", "Tags": ["Kim"], "SortOrder": 1}
//! ]"#;
//!
//! let manifest = Manifest::parse(body).unwrap();
//! let catalog = SoundCatalog::from_unsorted(manifest.sounds);
//! assert_eq!(catalog.sounds()[0].name, "Gong");
//! ```

#![forbid(unsafe_code)]

pub mod asset;
pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

pub use asset::{AssetRequest, AssetResponse, CacheStorage, Network, ResponseKind};
pub use error::{Result, SoundboardError};
pub use storage::{KeyValueStore, SOUND_MAP_KEY};
pub use traits::{
    AudioBackend, AudioEvent, AudioEventReceiver, AudioEventSender, AudioHandle, HandleId, PlayId,
    ManifestSource, RowHandle, SoundRow, SoundboardView,
};
pub use types::{join_url, Manifest, SoundCatalog, SoundDescriptor};

//! Sound descriptors, the manifest, and the sorted catalog

use crate::error::{Result, SoundboardError};
use serde::{Deserialize, Serialize};

/// One entry of the remote sound manifest
///
/// Field names follow the manifest's wire format (`Name`, `Path`, `Tags`,
/// `SortOrder`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SoundDescriptor {
    /// Display name
    pub name: String,

    /// Resource path relative to the blob store base URL
    pub path: String,

    /// Tags; the first one is shown as attribution
    #[serde(default)]
    pub tags: Vec<String>,

    /// Display ordering key
    pub sort_order: i64,
}

impl SoundDescriptor {
    /// Create a descriptor
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        tags: Vec<String>,
        sort_order: i64,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            tags,
            sort_order,
        }
    }

    /// First tag, used as "by ..." attribution
    pub fn attribution(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

/// A fetched manifest: the raw body plus the descriptors parsed from it
///
/// The raw body is what gets persisted, byte for byte, so a later reload sees
/// exactly what the server sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Body as received
    pub body: String,

    /// Descriptors in manifest order
    pub sounds: Vec<SoundDescriptor>,
}

impl Manifest {
    /// Parse a manifest body (a JSON array of descriptors)
    pub fn parse(body: impl Into<String>) -> Result<Self> {
        let body = body.into();
        let sounds: Vec<SoundDescriptor> = serde_json::from_str(&body)
            .map_err(|e| SoundboardError::Manifest(format!("Malformed manifest: {}", e)))?;

        Ok(Self { body, sounds })
    }
}

/// Sounds sorted ascending by `sort_order`
///
/// Replaced wholesale on every sync, never edited in place. Sorting is stable,
/// so descriptors sharing a `sort_order` keep their manifest order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoundCatalog {
    sounds: Vec<SoundDescriptor>,
}

impl SoundCatalog {
    /// Build a catalog from descriptors in any order
    pub fn from_unsorted(mut sounds: Vec<SoundDescriptor>) -> Self {
        sounds.sort_by_key(|sound| sound.sort_order);
        Self { sounds }
    }

    /// Build a catalog from a persisted or fetched manifest body
    pub fn from_manifest_body(body: &str) -> Result<Self> {
        Ok(Self::from_unsorted(Manifest::parse(body)?.sounds))
    }

    /// Sorted descriptors
    pub fn sounds(&self) -> &[SoundDescriptor] {
        &self.sounds
    }

    /// Descriptor at a display position
    pub fn get(&self, index: usize) -> Option<&SoundDescriptor> {
        self.sounds.get(index)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SoundDescriptor> {
        self.sounds.iter()
    }
}

/// Join a base URL and a relative resource path with exactly one `/`
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

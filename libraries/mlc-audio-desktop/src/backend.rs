//! `AudioBackend` implementation over the CPAL engine
//!
//! Handles are cheap to create: they only record the source URL. Bytes are
//! downloaded, decoded, and converted the first time a handle plays, then
//! kept for the rest of the session.

use crate::decode::{convert_for_device, decode_clip, extension_hint};
use crate::error::DesktopAudioError;
use crate::output::{DeviceLayout, OutputEngine, Voice};
use async_trait::async_trait;
use mlc_client::ManifestClient;
use mlc_core::{AudioBackend, AudioEventSender, AudioHandle, HandleId, PlayId, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Desktop audio backend
pub struct DesktopAudioBackend {
    engine: Arc<OutputEngine>,
    client: Arc<ManifestClient>,
    next_id: AtomicU64,
}

impl DesktopAudioBackend {
    /// Open the default output device, downloading clips through `client`
    ///
    /// # Errors
    /// Returns an error if the output device cannot be opened
    pub fn new(
        client: Arc<ManifestClient>,
        events: AudioEventSender,
    ) -> std::result::Result<Self, DesktopAudioError> {
        let engine = OutputEngine::new(events)?;
        Ok(Self {
            engine: Arc::new(engine),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn layout(&self) -> DeviceLayout {
        self.engine.layout()
    }
}

#[async_trait]
impl AudioBackend for DesktopAudioBackend {
    async fn create_handle(&self, source_url: &str) -> Result<Arc<dyn AudioHandle>> {
        url::Url::parse(source_url)
            .map_err(|e| DesktopAudioError::InvalidUrl(format!("{}: {}", source_url, e)))?;

        let id = HandleId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(handle = %id, url = %source_url, "Registered clip");

        Ok(Arc::new(DesktopHandle {
            id,
            source: source_url.to_string(),
            engine: Arc::clone(&self.engine),
            client: Arc::clone(&self.client),
            voice: OnceCell::new(),
        }))
    }
}

/// Lazily loaded clip
pub struct DesktopHandle {
    id: HandleId,
    source: String,
    engine: Arc<OutputEngine>,
    client: Arc<ManifestClient>,
    voice: OnceCell<Arc<Voice>>,
}

impl DesktopHandle {
    async fn load(&self) -> std::result::Result<Arc<Voice>, DesktopAudioError> {
        let bytes = self.client.fetch_bytes(&self.source).await?;
        let extension = extension_hint(&self.source);
        let layout = self.engine.layout();
        let id = self.id;

        let samples = tokio::task::spawn_blocking(move || {
            let clip = decode_clip(bytes, extension.as_deref())?;
            convert_for_device(&clip, layout.channels, layout.sample_rate)
        })
        .await
        .map_err(|e| DesktopAudioError::Decode(format!("Decode task failed: {}", e)))??;

        info!(handle = %id, samples = samples.len(), "Loaded clip");
        Ok(Arc::new(Voice::new(id, samples)))
    }
}

#[async_trait]
impl AudioHandle for DesktopHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn source(&self) -> &str {
        &self.source
    }

    async fn play(&self) -> Result<PlayId> {
        let voice = self.voice.get_or_try_init(|| self.load()).await?;
        let play = self.engine.start(Arc::clone(voice)).await?;
        Ok(play)
    }

    fn pause(&self) {
        if let Some(voice) = self.voice.get() {
            voice.pause();
        }
    }

    fn rewind(&self) {
        if let Some(voice) = self.voice.get() {
            voice.rewind();
        }
    }

    fn is_playing(&self) -> bool {
        self.voice.get().is_some_and(|voice| voice.is_playing())
    }
}

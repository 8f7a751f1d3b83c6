//! Soundboard controller - core orchestration
//!
//! Owns the catalog, the audio handle cache, and the playback slot, and drives
//! the view. All methods take `&mut self`: the controller is meant to live on
//! one task that processes UI input and audio events in order.

use crate::{
    handles::AudioHandleCache,
    slot::PlaybackSlot,
    types::{
        CacheLoad, PreloadReport, SyncReport, SyncTicket, ToggleOutcome, CACHE_LOAD_ERROR,
        PLAYBACK_ERROR, SYNC_ERROR,
    },
};
use futures_util::stream::{FuturesUnordered, StreamExt};
use mlc_core::{
    AudioBackend, AudioEvent, KeyValueStore, Manifest, ManifestSource, Result, RowHandle,
    SoundCatalog, SoundDescriptor, SoundRow, SoundboardError, SoundboardView, SOUND_MAP_KEY,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared services the controller depends on
#[derive(Clone)]
pub struct ControllerServices {
    pub store: Arc<dyn KeyValueStore>,
    pub source: Arc<dyn ManifestSource>,
    pub audio: Arc<dyn AudioBackend>,
}

/// Manifest and playback controller
///
/// # Example
///
/// ```rust,ignore
/// let mut controller = SoundboardController::new(services, Box::new(view));
/// controller.load_from_cache().await?;
///
/// let row = controller.rows()[0].handle;
/// controller.toggle_row(row).await?;
/// ```
pub struct SoundboardController {
    services: ControllerServices,
    view: Box<dyn SoundboardView>,
    catalog: SoundCatalog,
    handles: AudioHandleCache,
    slot: Option<PlaybackSlot>,
    rows: Vec<SoundRow>,
    render_generation: u64,
    sync_generation: u64,
}

impl SoundboardController {
    /// Create a controller with an empty catalog
    pub fn new(services: ControllerServices, view: Box<dyn SoundboardView>) -> Self {
        Self {
            services,
            view,
            catalog: SoundCatalog::default(),
            handles: AudioHandleCache::new(),
            slot: None,
            rows: Vec::new(),
            render_generation: 0,
            sync_generation: 0,
        }
    }

    // ===== Accessors =====

    pub fn catalog(&self) -> &SoundCatalog {
        &self.catalog
    }

    /// Rows of the latest render
    pub fn rows(&self) -> &[SoundRow] {
        &self.rows
    }

    pub fn handles(&self) -> &AudioHandleCache {
        &self.handles
    }

    pub fn slot(&self) -> Option<&PlaybackSlot> {
        self.slot.as_ref()
    }

    /// Sound currently playing, if any
    pub fn now_playing(&self) -> Option<&SoundDescriptor> {
        self.slot.as_ref().map(PlaybackSlot::sound)
    }

    /// Manifest source, for callers that fetch outside the controller
    pub fn manifest_source(&self) -> Arc<dyn ManifestSource> {
        Arc::clone(&self.services.source)
    }

    // ===== Startup =====

    /// Render the persisted snapshot, or sync when there is none
    ///
    /// A snapshot that cannot be read or parsed is reported to the user and
    /// returned as an error; there is no fallback sync in that case.
    pub async fn load_from_cache(&mut self) -> Result<CacheLoad> {
        let snapshot = match self.services.store.get(SOUND_MAP_KEY).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Error loading cached sounds");
                self.view.show_error(CACHE_LOAD_ERROR);
                return Err(e);
            }
        };

        let Some(body) = snapshot else {
            info!("No cached manifest, syncing");
            return self.sync().await.map(CacheLoad::Synced);
        };

        match SoundCatalog::from_manifest_body(&body) {
            Ok(catalog) => {
                info!(sounds = catalog.len(), "Restored sounds from cache");
                self.catalog = catalog;
                self.render();
                Ok(CacheLoad::Restored {
                    sounds: self.catalog.len(),
                })
            }
            Err(e) => {
                error!(error = %e, "Error loading cached sounds");
                self.view.show_error(CACHE_LOAD_ERROR);
                Err(e)
            }
        }
    }

    // ===== Sync =====

    /// Fetch the manifest and replace the catalog with it
    pub async fn sync(&mut self) -> Result<SyncReport> {
        let ticket = self.begin_sync();
        let result = self.services.source.fetch_manifest().await;
        self.apply_sync(ticket, result).await
    }

    /// Start a sync: show the loading indicator and issue a fresh ticket
    ///
    /// Issuing a ticket invalidates every ticket issued before it.
    pub fn begin_sync(&mut self) -> SyncTicket {
        self.sync_generation += 1;
        self.view.show_loading(true);
        self.view.hide_error();

        debug!(generation = self.sync_generation, "Sync started");
        SyncTicket::new(self.sync_generation)
    }

    /// Whether `ticket` is still the most recent sync
    pub fn is_current(&self, ticket: SyncTicket) -> bool {
        ticket.generation() == self.sync_generation
    }

    /// Finish a sync with the result of fetching the manifest
    ///
    /// Results for superseded tickets are dropped without touching any state.
    /// On failure the existing catalog stays as it is.
    pub async fn apply_sync(
        &mut self,
        ticket: SyncTicket,
        result: Result<Manifest>,
    ) -> Result<SyncReport> {
        if !self.is_current(ticket) {
            debug!(
                generation = ticket.generation(),
                current = self.sync_generation,
                "Discarding result of superseded sync"
            );
            return Ok(SyncReport::Superseded);
        }

        let manifest = match result {
            Ok(manifest) => manifest,
            Err(e) => return Err(self.fail_sync(e)),
        };

        if let Err(e) = self.services.store.set(SOUND_MAP_KEY, &manifest.body).await {
            return Err(self.fail_sync(e));
        }

        self.catalog = SoundCatalog::from_unsorted(manifest.sounds);
        let preload = self.preload().await;
        self.render();
        self.view.show_loading(false);

        info!(
            sounds = self.catalog.len(),
            preloaded = preload.usable(),
            failed = preload.failed,
            "Sync complete"
        );

        Ok(SyncReport::Applied {
            sounds: self.catalog.len(),
            preload,
        })
    }

    fn fail_sync(&mut self, err: SoundboardError) -> SoundboardError {
        error!(error = %err, "Sync error");
        self.view.show_error(SYNC_ERROR);
        self.view.show_loading(false);
        err
    }

    // ===== Preload =====

    /// Register an audio handle for every sound in the catalog
    ///
    /// Registrations run concurrently and are all awaited; a failed one is
    /// logged and skipped. Paths that already have a handle reuse it. Progress
    /// is reported to the view after every handle that becomes usable.
    pub async fn preload(&mut self) -> PreloadReport {
        let total = self.catalog.len();
        let mut report = PreloadReport {
            total,
            ..PreloadReport::default()
        };

        let mut seen = HashSet::new();
        let mut pending = FuturesUnordered::new();

        for sound in self.catalog.iter() {
            if self.handles.contains(&sound.path) || !seen.insert(sound.path.clone()) {
                report.reused += 1;
                continue;
            }

            let backend = Arc::clone(&self.services.audio);
            let url = self.services.source.resource_url(&sound.path);
            let path = sound.path.clone();
            let name = sound.name.clone();
            pending.push(async move {
                let result = backend.create_handle(&url).await;
                (path, name, result)
            });
        }

        if report.reused > 0 {
            self.view.show_progress(report.reused, total);
        }

        while let Some((path, name, result)) = pending.next().await {
            match result {
                Ok(handle) => {
                    self.handles.insert(path, handle);
                    report.registered += 1;
                    self.view.show_progress(report.usable(), total);
                }
                Err(e) => {
                    error!(sound = %name, path = %path, error = %e, "Error preloading sound");
                    report.failed += 1;
                }
            }
        }

        debug!(
            registered = report.registered,
            reused = report.reused,
            failed = report.failed,
            "Preload finished"
        );
        report
    }

    // ===== Rendering =====

    /// Rebuild every row from the catalog
    ///
    /// If a sound is playing, the slot follows its clip to the new row showing
    /// it. A clip that no longer appears in the catalog is stopped.
    pub fn render(&mut self) {
        self.render_generation += 1;
        let generation = self.render_generation;

        self.rows = self
            .catalog
            .iter()
            .enumerate()
            .map(|(index, sound)| SoundRow {
                handle: RowHandle::new(generation, index),
                name: sound.name.clone(),
                attribution: sound.attribution().map(str::to_string),
                path: sound.path.clone(),
            })
            .collect();

        self.view.render(&self.rows);

        let Some(path) = self.slot.as_ref().map(|slot| slot.sound().path.clone()) else {
            return;
        };

        let rebound = self
            .catalog
            .iter()
            .enumerate()
            .find(|(_, sound)| sound.path == path)
            .map(|(index, sound)| (RowHandle::new(generation, index), sound.clone()));

        match rebound {
            Some((row, sound)) => {
                if let Some(slot) = self.slot.as_mut() {
                    slot.rebind(row, sound);
                }
                self.view.set_playing(row, true);
            }
            None => {
                debug!(path = %path, "Playing sound left the catalog");
                self.stop();
            }
        }
    }

    /// Descriptor shown by a row of the latest render
    pub fn sound_for_row(&self, row: RowHandle) -> Option<&SoundDescriptor> {
        if row.generation() != self.render_generation {
            return None;
        }
        self.catalog.get(row.index())
    }

    // ===== Playback =====

    /// Toggle the sound shown by a row of the latest render
    pub async fn toggle_row(&mut self, row: RowHandle) -> Result<ToggleOutcome> {
        let sound = self.sound_for_row(row).cloned().ok_or_else(|| {
            SoundboardError::Other(format!(
                "Row {} of render {} is not displayed",
                row.index(),
                row.generation()
            ))
        })?;
        self.toggle(&sound, row).await
    }

    /// Play `sound` in `row`, or stop it if that row is already playing
    ///
    /// Starting a sound always stops the previous one first, so at most one
    /// slot exists. If playback cannot start the row is reverted and no slot
    /// is installed.
    pub async fn toggle(&mut self, sound: &SoundDescriptor, row: RowHandle) -> Result<ToggleOutcome> {
        if self.slot.as_ref().is_some_and(|slot| slot.row() == row) {
            self.stop();
            return Ok(ToggleOutcome::Stopped);
        }

        self.stop();

        let url = self.services.source.resource_url(&sound.path);
        let handle = match self
            .handles
            .resolve(self.services.audio.as_ref(), &sound.path, &url)
            .await
        {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail_playback(row, e)),
        };

        self.view.set_playing(row, true);
        handle.rewind();

        let play = match handle.play().await {
            Ok(play) => play,
            Err(e) => return Err(self.fail_playback(row, e)),
        };

        info!(sound = %sound.name, handle = %handle.id(), play = %play, "Playing sound");
        self.slot = Some(PlaybackSlot::new(handle, play, row, sound.clone()));
        Ok(ToggleOutcome::Started)
    }

    fn fail_playback(&mut self, row: RowHandle, err: SoundboardError) -> SoundboardError {
        error!(error = %err, "Error playing sound");
        self.view.show_error(PLAYBACK_ERROR);
        self.view.set_playing(row, false);
        err
    }

    /// Stop the playing sound and clear the slot
    ///
    /// Returns `false` if nothing was playing.
    pub fn stop(&mut self) -> bool {
        let Some(slot) = self.slot.take() else {
            return false;
        };

        slot.halt();
        self.view.set_playing(slot.row(), false);

        debug!(sound = %slot.sound().name, "Stopped sound");
        true
    }

    /// React to an event from the audio backend
    ///
    /// Only events from the slot's current play count; events from another
    /// handle, or from an earlier play of the same handle, are stale and
    /// ignored. Returns `true` if the slot was cleared.
    pub fn handle_audio_event(&mut self, event: AudioEvent) -> bool {
        if !self.slot.as_ref().is_some_and(|slot| slot.owns(&event)) {
            warn!(
                handle = %event.handle(),
                play = %event.play(),
                "Ignoring event for a play that is not current"
            );
            return false;
        }

        match event {
            AudioEvent::Ended { handle, play } => {
                debug!(handle = %handle, play = %play, "Sound finished");
            }
            AudioEvent::Failed { handle, message, .. } => {
                error!(handle = %handle, error = %message, "Playback failed");
                self.view.show_error(PLAYBACK_ERROR);
            }
        }
        self.stop()
    }
}

impl std::fmt::Debug for SoundboardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundboardController")
            .field("sounds", &self.catalog.len())
            .field("handles", &self.handles.len())
            .field("slot", &self.slot)
            .field("render_generation", &self.render_generation)
            .field("sync_generation", &self.sync_generation)
            .finish()
    }
}

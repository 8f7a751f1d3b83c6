//! Hand-written fakes for the controller's collaborators
#![allow(dead_code)]

use async_trait::async_trait;
use mlc_core::{
    AudioBackend, AudioHandle, HandleId, KeyValueStore, Manifest, ManifestSource, PlayId, Result,
    RowHandle, SoundRow, SoundboardError, SoundboardView,
};
use mlc_playback::{ControllerServices, SoundboardController};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BASE: &str = "https://blob.test/mlc-soundbank";

/// Build a manifest body from `(name, path, tag, sort_order)` tuples
pub fn manifest_body(sounds: &[(&str, &str, &str, i64)]) -> String {
    let entries: Vec<String> = sounds
        .iter()
        .map(|(name, path, tag, order)| {
            format!(r#"{{"Name":"{name}","Path":"{path}","Tags":["{tag}"],"SortOrder":{order}}}"#)
        })
        .collect();
    format!("[{}]", entries.join(","))
}

// ===== Store =====

#[derive(Default)]
pub struct FakeStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl FakeStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FakeStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SoundboardError::storage("quota exceeded"));
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

// ===== Manifest source =====

/// Serves a fixed body; `None` means the server is unreachable
pub struct FakeSource {
    body: Mutex<Option<String>>,
    fetches: AtomicUsize,
}

impl FakeSource {
    pub fn serving(body: impl Into<String>) -> Self {
        Self {
            body: Mutex::new(Some(body.into())),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            body: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn serve(&self, body: impl Into<String>) {
        *self.body.lock().unwrap() = Some(body.into());
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ManifestSource for FakeSource {
    async fn fetch_manifest(&self) -> Result<Manifest> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let body = self.body.lock().unwrap().clone();
        match body {
            Some(body) => Manifest::parse(body),
            None => Err(SoundboardError::network("connection refused")),
        }
    }

    fn resource_url(&self, path: &str) -> String {
        format!("{BASE}/{path}")
    }
}

// ===== Audio =====

pub struct FakeHandle {
    id: HandleId,
    source: String,
    fail_play: bool,
    playing: AtomicBool,
    plays: AtomicUsize,
    rewinds: AtomicUsize,
}

impl FakeHandle {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn rewinds(&self) -> usize {
        self.rewinds.load(Ordering::SeqCst)
    }

    /// Id returned by the most recent successful `play`
    pub fn last_play(&self) -> PlayId {
        PlayId::new(self.plays() as u64)
    }
}

#[async_trait]
impl AudioHandle for FakeHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn source(&self) -> &str {
        &self.source
    }

    async fn play(&self) -> Result<PlayId> {
        if self.fail_play {
            return Err(SoundboardError::audio("decode failed"));
        }
        let play = self.plays.fetch_add(1, Ordering::SeqCst) + 1;
        self.playing.store(true, Ordering::SeqCst);
        Ok(PlayId::new(play as u64))
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn rewind(&self) {
        self.rewinds.fetch_add(1, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeBackend {
    next_id: AtomicU64,
    failing_create: Mutex<HashSet<String>>,
    failing_play: Mutex<HashSet<String>>,
    created: Mutex<Vec<Arc<FakeHandle>>>,
}

impl FakeBackend {
    /// Refuse to register handles for `path`
    pub fn fail_create(&self, path: &str) {
        self.failing_create
            .lock()
            .unwrap()
            .insert(format!("{BASE}/{path}"));
    }

    /// Register handles for `path` whose `play` fails
    pub fn fail_play(&self, path: &str) {
        self.failing_play
            .lock()
            .unwrap()
            .insert(format!("{BASE}/{path}"));
    }

    pub fn created(&self) -> Vec<Arc<FakeHandle>> {
        self.created.lock().unwrap().clone()
    }

    pub fn handle_for(&self, path: &str) -> Option<Arc<FakeHandle>> {
        let url = format!("{BASE}/{path}");
        self.created().into_iter().find(|h| h.source == url)
    }

    pub fn playing_count(&self) -> usize {
        self.created().iter().filter(|h| h.is_playing()).count()
    }
}

#[async_trait]
impl AudioBackend for FakeBackend {
    async fn create_handle(&self, source_url: &str) -> Result<Arc<dyn AudioHandle>> {
        if self.failing_create.lock().unwrap().contains(source_url) {
            return Err(SoundboardError::audio(format!("cannot load {source_url}")));
        }

        let handle = Arc::new(FakeHandle {
            id: HandleId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            source: source_url.to_string(),
            fail_play: self.failing_play.lock().unwrap().contains(source_url),
            playing: AtomicBool::new(false),
            plays: AtomicUsize::new(0),
            rewinds: AtomicUsize::new(0),
        });
        self.created.lock().unwrap().push(Arc::clone(&handle));
        Ok(handle)
    }
}

// ===== View =====

#[derive(Debug, Default)]
pub struct ViewState {
    pub rows: Vec<SoundRow>,
    pub generation: Option<u64>,
    pub renders: usize,
    pub playing: HashSet<RowHandle>,
    pub loading: bool,
    pub progress: Vec<(usize, usize)>,
    pub error: Option<String>,
}

impl ViewState {
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.name.as_str()).collect()
    }

    pub fn playing_names(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| self.playing.contains(&row.handle))
            .map(|row| row.name.as_str())
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct RecordingView {
    state: Arc<Mutex<ViewState>>,
}

impl RecordingView {
    pub fn state(&self) -> std::sync::MutexGuard<'_, ViewState> {
        self.state.lock().unwrap()
    }
}

impl SoundboardView for RecordingView {
    fn render(&mut self, rows: &[SoundRow]) {
        let mut state = self.state();
        state.rows = rows.to_vec();
        state.generation = rows.first().map(|row| row.handle.generation());
        state.renders += 1;
        state.playing.clear();
    }

    fn set_playing(&mut self, row: RowHandle, playing: bool) {
        let mut state = self.state();
        if state.generation != Some(row.generation()) {
            return;
        }
        if playing {
            state.playing.insert(row);
        } else {
            state.playing.remove(&row);
        }
    }

    fn show_loading(&mut self, visible: bool) {
        self.state().loading = visible;
    }

    fn show_progress(&mut self, loaded: usize, total: usize) {
        self.state().progress.push((loaded, total));
    }

    fn show_error(&mut self, message: &str) {
        self.state().error = Some(message.to_string());
    }

    fn hide_error(&mut self) {
        self.state().error = None;
    }
}

// ===== Harness =====

pub struct Harness {
    pub controller: SoundboardController,
    pub store: Arc<FakeStore>,
    pub source: Arc<FakeSource>,
    pub audio: Arc<FakeBackend>,
    pub view: RecordingView,
}

impl Harness {
    pub fn new(store: FakeStore, source: FakeSource) -> Self {
        Self::with_backend(store, source, FakeBackend::default())
    }

    pub fn with_backend(store: FakeStore, source: FakeSource, audio: FakeBackend) -> Self {
        let store = Arc::new(store);
        let source = Arc::new(source);
        let audio = Arc::new(audio);
        let view = RecordingView::default();

        let services = ControllerServices {
            store: store.clone(),
            source: source.clone(),
            audio: audio.clone(),
        };
        let controller = SoundboardController::new(services, Box::new(view.clone()));

        Self {
            controller,
            store,
            source,
            audio,
            view,
        }
    }

    /// Row currently showing the sound called `name`
    pub fn row(&self, name: &str) -> RowHandle {
        self.controller
            .rows()
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.handle)
            .unwrap_or_else(|| panic!("no row named {name}"))
    }
}

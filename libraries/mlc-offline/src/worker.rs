//! Cache-first offline worker
//!
//! One worker instance represents one shell version. It precaches the shell
//! on install, serves requests cache-first, writes eligible network responses
//! through to its cache, and drops other versions' caches on activate.

use crate::config::WorkerConfig;
use crate::error::{Result, WorkerError};
use crate::lifecycle::{WorkerMessage, WorkerState};
use futures_util::future::try_join_all;
use mlc_core::{AssetRequest, AssetResponse, CacheStorage, Network, ResponseKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};

pub struct OfflineWorker {
    config: WorkerConfig,
    cache: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    state: Mutex<WorkerState>,
    skip_waiting: AtomicBool,
}

impl OfflineWorker {
    pub fn new(
        config: WorkerConfig,
        cache: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            config,
            cache,
            network,
            state: Mutex::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: WorkerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        debug!(version = %self.config.cache_version, state = ?state, "Worker state changed");
    }

    /// Whether a skip-waiting message has been received
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Install, then activate unless another version's cache is still present
    ///
    /// A worker that finds older caches stays waiting until it receives
    /// `skipWaiting`; while waiting, older entries keep being served.
    pub async fn start(&self) -> Result<WorkerState> {
        self.install().await?;

        let others = self
            .cache
            .keys()
            .await?
            .into_iter()
            .filter(|name| *name != self.config.cache_version)
            .count();

        if others == 0 || self.skip_waiting_requested() {
            self.activate().await?;
        } else {
            info!(
                version = %self.config.cache_version,
                previous = others,
                "New shell version waiting to activate"
            );
        }

        Ok(self.state())
    }

    /// Precache every shell file
    ///
    /// All files are fetched concurrently. If any fetch fails or returns a
    /// non-OK status, nothing is written and the worker becomes redundant.
    pub async fn install(&self) -> Result<usize> {
        self.set_state(WorkerState::Installing);

        let result = self.precache().await;
        match &result {
            Ok(count) => {
                self.set_state(WorkerState::Installed);
                info!(version = %self.config.cache_version, files = count, "Shell precached");
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant);
                error!(version = %self.config.cache_version, error = %e, "Install failed");
            }
        }
        result
    }

    async fn precache(&self) -> Result<usize> {
        let version = &self.config.cache_version;
        self.cache.open(version).await?;

        let requests = self
            .config
            .precache
            .iter()
            .map(|path| AssetRequest::resolve(&self.config.origin, path))
            .collect::<mlc_core::Result<Vec<_>>>()?;

        let entries = try_join_all(requests.into_iter().map(|request| async move {
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| WorkerError::install(request.url.as_str(), e.to_string()))?;

            if !response.is_ok() {
                return Err(WorkerError::install(
                    request.url.as_str(),
                    format!("status {}", response.status),
                ));
            }
            Ok::<_, WorkerError>((request, response))
        }))
        .await?;

        self.cache.put_all(version, &entries).await?;
        Ok(entries.len())
    }

    /// Serve a request cache-first
    ///
    /// Hits are returned as stored. Misses go to the network; the response is
    /// written to the current version's cache when [`Self::should_store`]
    /// allows it. A failed cache write is logged and the response still
    /// returned.
    pub async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse> {
        if let Some(hit) = self.cache.match_request(request).await? {
            debug!(url = %request.url, "Cache hit");
            return Ok(hit);
        }

        let response = self.network.fetch(request).await.map_err(|e| {
            error!(url = %request.url, error = %e, "Fetch failed");
            WorkerError::from(e)
        })?;

        if self.should_store(request, &response) {
            if let Err(e) = self
                .cache
                .put(&self.config.cache_version, request, &response)
                .await
            {
                warn!(url = %request.url, error = %e, "Failed to cache response");
            }
        } else {
            debug!(
                url = %request.url,
                status = response.status,
                kind = %response.kind,
                "Response not cached"
            );
        }

        Ok(response)
    }

    /// Write-through rule for network responses
    ///
    /// Only exact 200s from the shell's own origin, fetched with GET, from a
    /// host that is not excluded.
    pub fn should_store(&self, request: &AssetRequest, response: &AssetResponse) -> bool {
        response.status == 200
            && response.kind == ResponseKind::Basic
            && request.is_cacheable_method()
            && !self.config.is_excluded_host(request.host())
    }

    /// Delete every cache except the current version's
    ///
    /// Returns the names that were deleted.
    pub async fn activate(&self) -> Result<Vec<String>> {
        self.set_state(WorkerState::Activating);

        let mut deleted = Vec::new();
        for name in self.cache.keys().await? {
            if name == self.config.cache_version {
                continue;
            }
            if self.cache.delete(&name).await? {
                info!(cache = %name, "Deleted old cache");
                deleted.push(name);
            }
        }

        self.set_state(WorkerState::Activated);
        info!(version = %self.config.cache_version, "Worker activated");
        Ok(deleted)
    }

    /// Handle a control message
    ///
    /// `skipWaiting` activates a waiting worker immediately; a worker that is
    /// still installing activates as soon as install finishes. Unknown
    /// actions are ignored.
    pub async fn handle_message(&self, message: &WorkerMessage) -> Result<WorkerState> {
        match message {
            WorkerMessage::SkipWaiting => {
                self.skip_waiting.store(true, Ordering::SeqCst);
                info!(version = %self.config.cache_version, "Skip waiting requested");

                if self.state().is_waiting() {
                    self.activate().await?;
                }
            }
            WorkerMessage::Unknown => {
                debug!("Ignoring unknown worker message");
            }
        }
        Ok(self.state())
    }
}

impl std::fmt::Debug for OfflineWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineWorker")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("skip_waiting", &self.skip_waiting_requested())
            .finish()
    }
}

//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use mlc_core::{AssetRequest, AssetResponse, Network, ResponseKind, Result, SoundboardError};
use mlc_offline::{OfflineWorker, WorkerConfig, DEFAULT_CACHE_VERSION};
use mlc_storage::SqliteCacheStorage;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use url::Url;

pub const ORIGIN: &str = "http://localhost:8080/";

pub fn origin() -> Url {
    Url::parse(ORIGIN).unwrap()
}

pub fn shell_url(path: &str) -> Url {
    origin().join(path).unwrap()
}

/// SQLite cache backed by a real file
pub struct TestCache {
    pub cache: Arc<SqliteCacheStorage>,
    _temp_dir: TempDir,
}

impl TestCache {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", temp_dir.path().join("cache.db").display());
        let pool = mlc_storage::open(&db_url)
            .await
            .expect("Failed to open database");

        Self {
            cache: Arc::new(SqliteCacheStorage::new(pool)),
            _temp_dir: temp_dir,
        }
    }

    pub async fn entries(&self, cache_name: &str) -> usize {
        self.cache.entry_count(cache_name).await.unwrap()
    }
}

/// Scripted network: URL -> response, with failures and a call counter
#[derive(Default)]
pub struct FakeNetwork {
    responses: Mutex<HashMap<String, AssetResponse>>,
    unreachable: Mutex<HashSet<String>>,
    requested: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl FakeNetwork {
    /// Serve every default shell file as a same-origin 200
    pub fn serving_shell() -> Self {
        let network = Self::default();
        for path in mlc_offline::DEFAULT_PRECACHE {
            network.respond(
                shell_url(path).as_str(),
                AssetResponse::new(200, ResponseKind::Basic, format!("shell {}", path))
                    .with_header("Content-Type", "text/plain"),
            );
        }
        network
    }

    pub fn respond(&self, url: &str, response: AssetResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn fail(&self, url: &str) {
        self.unreachable.lock().unwrap().insert(url.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every URL fetched so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url.as_str();
        self.requested.lock().unwrap().push(url.to_string());

        if self.unreachable.lock().unwrap().contains(url) {
            return Err(SoundboardError::network("connection refused"));
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| AssetResponse::new(404, ResponseKind::Basic, "not found")))
    }
}

pub fn worker_config(version: &str) -> WorkerConfig {
    WorkerConfig::new(version, origin())
}

pub fn worker(
    cache: &TestCache,
    network: Arc<FakeNetwork>,
    version: &str,
) -> OfflineWorker {
    OfflineWorker::new(worker_config(version), cache.cache.clone(), network)
}

pub fn default_worker(cache: &TestCache, network: Arc<FakeNetwork>) -> OfflineWorker {
    worker(cache, network, DEFAULT_CACHE_VERSION)
}

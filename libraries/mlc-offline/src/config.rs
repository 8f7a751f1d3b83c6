/// Offline shell settings
use url::Url;

/// Cache name of the current shell version
pub const DEFAULT_CACHE_VERSION: &str = "mlc-soundboard-v1";

/// Shell files fetched during install
pub const DEFAULT_PRECACHE: [&str; 5] = [
    "/",
    "/index.html",
    "/css/styles.css",
    "/js/soundboard.js",
    "/images/mlc-logo.png",
];

/// Hosts whose responses are never written to the cache
///
/// Sound clips live in blob storage and are handled by the audio layer.
pub const DEFAULT_EXCLUDED_HOSTS: [&str; 1] = ["blob.core.windows.net"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Cache name for this version; every other name is deleted on activate
    pub cache_version: String,

    /// Origin the shell is served from; same-origin responses are `basic`
    pub origin: Url,

    /// Paths (relative to `origin`) fetched on install
    pub precache: Vec<String>,

    /// Host suffixes excluded from write-through caching
    pub excluded_hosts: Vec<String>,
}

impl WorkerConfig {
    pub fn new(cache_version: impl Into<String>, origin: Url) -> Self {
        Self {
            cache_version: cache_version.into(),
            origin,
            precache: DEFAULT_PRECACHE.iter().map(|p| p.to_string()).collect(),
            excluded_hosts: DEFAULT_EXCLUDED_HOSTS
                .iter()
                .map(|h| h.to_string())
                .collect(),
        }
    }

    #[must_use]
    pub fn with_precache(mut self, precache: Vec<String>) -> Self {
        self.precache = precache;
        self
    }

    #[must_use]
    pub fn with_excluded_hosts(mut self, hosts: Vec<String>) -> Self {
        self.excluded_hosts = hosts;
        self
    }

    /// Whether `host` is excluded, matching the host itself or any subdomain
    pub fn is_excluded_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.excluded_hosts.iter().any(|excluded| {
            let excluded = excluded.to_ascii_lowercase();
            host == excluded || host.ends_with(&format!(".{}", excluded))
        })
    }
}

/// Soundboard configuration
use mlc_client::BlobStoreConfig;
use mlc_offline::{WorkerConfig, DEFAULT_CACHE_VERSION, DEFAULT_EXCLUDED_HOSTS, DEFAULT_PRECACHE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Config file read when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "soundboard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SoundboardConfig {
    #[serde(default = "default_manifest")]
    pub manifest: ManifestSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_shell")]
    pub shell: ShellSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManifestSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShellSettings {
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Public origin of the shell, used for cache keys
    #[serde(default = "default_origin")]
    pub origin: String,

    #[serde(default = "default_listen")]
    pub listen: String,

    /// Where shell files are fetched from on a miss
    #[serde(default = "default_upstream")]
    pub upstream: String,

    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    #[serde(default = "default_excluded_hosts")]
    pub excluded_hosts: Vec<String>,
}

impl SoundboardConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default file is optional.
    /// Environment variables prefixed with `SOUNDBOARD_` override the file,
    /// with `__` between section and key (`SOUNDBOARD_MANIFEST__BASE_URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("SOUNDBOARD")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("shell.precache")
                .with_list_parse_key("shell.excluded_hosts")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.manifest.base_url).map_err(|e| {
            ConfigError::Invalid(format!(
                "manifest.base_url must be an absolute URL ({}): {}",
                e, self.manifest.base_url
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "manifest.base_url must use http or https: {}",
                self.manifest.base_url
            )));
        }

        if self.manifest.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "manifest.file_name is required".to_string(),
            ));
        }

        if self.shell.cache_version.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "shell.cache_version is required (set SOUNDBOARD_SHELL__CACHE_VERSION)".to_string(),
            ));
        }

        for (key, value) in [
            ("shell.origin", &self.shell.origin),
            ("shell.upstream", &self.shell.upstream),
        ] {
            Url::parse(value).map_err(|e| {
                ConfigError::Invalid(format!("{} must be an absolute URL ({}): {}", key, e, value))
            })?;
        }

        Ok(())
    }

    pub fn blob_store(&self) -> BlobStoreConfig {
        BlobStoreConfig::new(&self.manifest.base_url, &self.manifest.file_name)
    }

    /// Worker settings for the shell server
    pub fn worker(&self) -> Result<WorkerConfig> {
        let origin = Url::parse(&self.shell.origin)
            .map_err(|e| ConfigError::Invalid(format!("shell.origin: {}", e)))?;

        Ok(WorkerConfig::new(&self.shell.cache_version, origin)
            .with_precache(self.shell.precache.clone())
            .with_excluded_hosts(self.shell.excluded_hosts.clone()))
    }
}

// Default values
fn default_manifest() -> ManifestSettings {
    ManifestSettings {
        base_url: default_base_url(),
        file_name: default_file_name(),
    }
}

fn default_base_url() -> String {
    mlc_client::DEFAULT_BASE_URL.to_string()
}

fn default_file_name() -> String {
    mlc_client::DEFAULT_MANIFEST_FILE.to_string()
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/soundboard.db".to_string()
}

fn default_shell() -> ShellSettings {
    ShellSettings {
        cache_version: default_cache_version(),
        origin: default_origin(),
        listen: default_listen(),
        upstream: default_upstream(),
        precache: default_precache(),
        excluded_hosts: default_excluded_hosts(),
    }
}

fn default_cache_version() -> String {
    DEFAULT_CACHE_VERSION.to_string()
}

fn default_origin() -> String {
    "http://localhost:8080/".to_string()
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_upstream() -> String {
    "http://localhost:3000/".to_string()
}

fn default_precache() -> Vec<String> {
    DEFAULT_PRECACHE.iter().map(|p| p.to_string()).collect()
}

fn default_excluded_hosts() -> Vec<String> {
    DEFAULT_EXCLUDED_HOSTS.iter().map(|h| h.to_string()).collect()
}

impl Default for SoundboardConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            storage: default_storage(),
            shell: default_shell(),
        }
    }
}

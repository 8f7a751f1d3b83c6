//! Blob store client.

use crate::error::{ClientError, Result};
use crate::types::BlobStoreConfig;
use async_trait::async_trait;
use bytes::Bytes;
use mlc_core::{join_url, Manifest, ManifestSource};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, info};

/// Client for the container holding the manifest and the clips.
///
/// The manifest lives at `{base_url}/{manifest_file}`; clip paths from the
/// manifest are resolved against the same `base_url`.
#[derive(Debug, Clone)]
pub struct ManifestClient {
    http: Client,
    base_url: String,
    manifest_url: String,
}

impl ManifestClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BlobStoreConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        if config.manifest_file.trim_matches('/').is_empty() {
            return Err(ClientError::InvalidUrl(
                "Manifest file name cannot be empty".into(),
            ));
        }
        let manifest_url = join_url(&base_url, &config.manifest_file);

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("MLCSoundboard/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            manifest_url,
        })
    }

    /// Container URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full manifest URL.
    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    /// Fetch and parse the manifest, keeping the raw body.
    pub async fn get_manifest(&self) -> Result<Manifest> {
        debug!(url = %self.manifest_url, "Fetching sound manifest");

        let response = self.send(&self.manifest_url).await?;
        let body = response.text().await?;

        let manifest = Manifest::parse(body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse manifest: {}", e)))?;

        info!(sounds = manifest.sounds.len(), "Fetched sound manifest");
        Ok(manifest)
    }

    /// Download the bytes behind an absolute URL.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes> {
        debug!(url = %url, "Downloading clip");

        let response = self.send(url).await?;
        let bytes = response.bytes().await?;

        debug!(url = %url, bytes = bytes.len(), "Downloaded clip");
        Ok(bytes)
    }

    /// GET a URL and turn non-success statuses into errors.
    async fn send(&self, url: &str) -> Result<Response> {
        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ClientError::ServerUnreachable(e.to_string())
            } else {
                ClientError::Request(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}

#[async_trait]
impl ManifestSource for ManifestClient {
    async fn fetch_manifest(&self) -> mlc_core::Result<Manifest> {
        Ok(self.get_manifest().await?)
    }

    fn resource_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

//! Offline asset cache contracts
//!
//! Request/response types and the storage and network traits the offline
//! worker is written against.

use crate::error::{Result, SoundboardError};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// How a response relates to the origin that requested it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// Same-origin response
    Basic,
    /// Cross-origin response with CORS headers
    Cors,
    /// Cross-origin response without CORS access
    Opaque,
}

impl ResponseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Cors => "cors",
            Self::Opaque => "opaque",
        }
    }

    /// Classify a response for `url` as seen from `origin`
    pub fn classify(origin: &Url, url: &Url, has_cors_headers: bool) -> Self {
        if origin.origin() == url.origin() {
            Self::Basic
        } else if has_cors_headers {
            Self::Cors
        } else {
            Self::Opaque
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseKind {
    type Err = SoundboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(Self::Basic),
            "cors" => Ok(Self::Cors),
            "opaque" => Ok(Self::Opaque),
            other => Err(SoundboardError::cache(format!(
                "Unknown response kind: {}",
                other
            ))),
        }
    }
}

/// A request for an application asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    /// HTTP method, upper case
    pub method: String,
    /// Absolute request URL
    pub url: Url,
}

impl AssetRequest {
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url,
        }
    }

    /// GET request for `url`
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// GET request for a path resolved against `origin`
    pub fn resolve(origin: &Url, path: &str) -> Result<Self> {
        Ok(Self::get(origin.join(path)?))
    }

    /// Only GET requests take part in caching
    pub fn is_cacheable_method(&self) -> bool {
        self.method == "GET"
    }

    /// Cache identity: the URL without its fragment
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.to_string()
    }

    /// Host of the request URL, empty if it has none
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

/// A response as stored in, or returned from, the asset cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl AssetResponse {
    pub fn new(status: u16, kind: ResponseKind, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            kind,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 2xx status
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Named, versioned response caches
///
/// Mirrors a browser `CacheStorage`: each name is one cache generation.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named cache if it does not exist yet
    async fn open(&self, cache_name: &str) -> Result<()>;

    /// Names of every existing cache
    async fn keys(&self) -> Result<Vec<String>>;

    /// Delete a cache and all its entries; `Ok(false)` if it did not exist
    async fn delete(&self, cache_name: &str) -> Result<bool>;

    /// Store one response, replacing any entry with the same key
    async fn put(
        &self,
        cache_name: &str,
        request: &AssetRequest,
        response: &AssetResponse,
    ) -> Result<()>;

    /// Store several responses atomically: either all are written or none
    async fn put_all(
        &self,
        cache_name: &str,
        entries: &[(AssetRequest, AssetResponse)],
    ) -> Result<()>;

    /// Look a request up across every cache
    async fn match_request(&self, request: &AssetRequest) -> Result<Option<AssetResponse>>;
}

/// Network access for cache misses
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request
    ///
    /// # Errors
    /// Transport failures only; non-success statuses are returned as responses
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse>;
}

//! `Network` implementation over reqwest
//!
//! Requests for the shell origin are sent to the upstream that actually hosts
//! the shell files; any other URL is fetched as is. Response kind is decided
//! against the shell origin, so proxied shell files are `basic`.

use async_trait::async_trait;
use mlc_core::{AssetRequest, AssetResponse, Network, ResponseKind, Result, SoundboardError};
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct HttpNetwork {
    http: Client,
    origin: Url,
    upstream: Url,
}

impl HttpNetwork {
    pub fn new(origin: Url, upstream: Url) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("mlc-offline/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SoundboardError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            origin,
            upstream,
        })
    }

    /// Address the request is actually sent to
    ///
    /// Shell-origin paths always stay under the upstream's path, whatever
    /// they contain.
    pub fn target_url(&self, url: &Url) -> Url {
        if url.origin() != self.origin.origin() {
            return url.clone();
        }

        let mut target = self.upstream.clone();
        let base = self.upstream.path().trim_end_matches('/');
        target.set_path(&format!("{}/{}", base, url.path().trim_start_matches('/')));
        target.set_query(url.query());
        target
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| SoundboardError::InvalidUrl(format!("Bad method: {}", e)))?;
        let target = self.target_url(&request.url);

        debug!(url = %request.url, target = %target, "Network fetch");

        let response = self
            .http
            .request(method, target)
            .send()
            .await
            .map_err(|e| SoundboardError::network(e.to_string()))?;

        let status = response.status().as_u16();
        let has_cors = response
            .headers()
            .contains_key(reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN);
        let kind = ResponseKind::classify(&self.origin, &request.url, has_cors);

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| SoundboardError::network(e.to_string()))?;

        Ok(AssetResponse {
            status,
            kind,
            headers,
            body,
        })
    }
}

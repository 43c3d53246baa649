//! Upstream network seam.
//!
//! The controller talks to the network through the [`Upstream`] trait so
//! strategies can be exercised against scripted fakes. The production
//! implementation wraps a shared `reqwest` client and snapshots responses
//! into the store format.

use async_trait::async_trait;
use axum::http::Method;
use bytes::Bytes;
use url::Url;

use crate::cache::StoredResponse;
use crate::error::{GatewayError, Result};

// == Fetch Request ==
/// A request the gateway has been asked to mediate.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute target URL
    pub url: Url,
    /// Whether this is a full-page navigation (drives the offline fallback)
    pub is_navigation: bool,
    /// Request body, forwarded verbatim for non-GET passthrough
    pub body: Option<Bytes>,
}

impl FetchRequest {
    /// Plain GET sub-resource request.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            is_navigation: false,
            body: None,
        }
    }

    /// GET request flagged as a page navigation.
    pub fn navigation(url: Url) -> Self {
        Self {
            is_navigation: true,
            ..Self::get(url)
        }
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }

    /// Cache key for this request. Keys are plain URLs; only GET requests
    /// ever reach a store, so the method needs no encoding.
    pub fn cache_key(&self) -> &str {
        self.url.as_str()
    }
}

// == Upstream Trait ==
/// Network access used by the fetch controller.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Performs the request against the real origin.
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse>;
}

// == HTTP Upstream ==
/// `reqwest`-backed upstream used by the running gateway.
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpUpstream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| GatewayError::Upstream(err.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|err| GatewayError::Upstream(err.to_string()))?;

        Ok(StoredResponse::new(status, headers, body))
    }
}

/// Headers that describe the connection rather than the resource; they must
/// not survive the snapshot (the serving side sets its own).
fn is_hop_by_hop(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
            | "content-length"
    )
}

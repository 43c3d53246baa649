//! Fetch controller: the mediation pipeline.
//!
//! Owns the store registry and the upstream seam, and resolves every
//! mediated request through the route table. Lifecycle mirrors the usual
//! install/activate split: install precaches the critical assets
//! all-or-nothing, activation purges stale cache generations and starts
//! intercepting. Until activation every request passes straight through.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{CacheStats, StoreRegistry, StoredResponse};
use crate::error::{GatewayError, Result};
use crate::fetch::rules;
use crate::fetch::{FetchRequest, Strategy, Upstream};

// == Store Names ==
/// Store populated once at install time with the precache manifest.
pub const STATIC_STORE: &str = "static";
/// Store for uncategorized page requests handled by the default handler.
pub const DYNAMIC_STORE: &str = "dynamic";

/// Fallback page served to offline navigations.
pub const OFFLINE_PAGE: &str = "/offline.html";

/// Critical assets fetched during install. All of them must arrive or the
/// install fails and nothing is stored.
pub const PRECACHE_MANIFEST: &[&str] = &[
    "/",
    "/offline.html",
    "/manifest.json",
    "/images/logo.png",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
];

// == Controller State ==
/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Created, precache not yet complete
    Installing,
    /// Precache complete, not yet intercepting
    Installed,
    /// Intercepting all mediated requests
    Activated,
}

impl ControllerState {
    /// Only an activated controller mediates requests.
    pub fn can_intercept(self) -> bool {
        matches!(self, ControllerState::Activated)
    }
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerState::Installing => write!(f, "installing"),
            ControllerState::Installed => write!(f, "installed"),
            ControllerState::Activated => write!(f, "activated"),
        }
    }
}

// == Fetch Controller ==
/// Mediates outbound requests through per-route caching strategies.
pub struct FetchController {
    /// Origin the precache manifest and offline fallback resolve against
    app_origin: Url,
    registry: Arc<RwLock<StoreRegistry>>,
    upstream: Arc<dyn Upstream>,
    state: std::sync::RwLock<ControllerState>,
}

impl FetchController {
    // == Constructor ==
    /// Creates a controller for the given cache generation and app origin.
    pub fn new(version: impl Into<String>, app_origin: Url, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            app_origin,
            registry: Arc::new(RwLock::new(StoreRegistry::new(version))),
            upstream,
            state: std::sync::RwLock::new(ControllerState::Installing),
        }
    }

    /// Shared handle to the store registry.
    pub fn registry(&self) -> Arc<RwLock<StoreRegistry>> {
        Arc::clone(&self.registry)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        *self.state.read().unwrap()
    }

    fn set_state(&self, state: ControllerState) {
        *self.state.write().unwrap() = state;
    }

    /// Current cache generation tag.
    pub async fn version(&self) -> String {
        self.registry.read().await.version().to_string()
    }

    /// Per-store statistics.
    pub async fn stats(&self) -> Vec<(String, CacheStats)> {
        self.registry.read().await.stats()
    }

    // == Install ==
    /// Precaches the manifest into the static store, all-or-nothing.
    ///
    /// Every asset must be fetched with a 2xx status; any failure aborts
    /// the install before a single entry is written, and the error
    /// propagates so startup can refuse to serve.
    pub async fn install(&self) -> Result<()> {
        let mut precached = Vec::with_capacity(PRECACHE_MANIFEST.len());
        for path in PRECACHE_MANIFEST {
            let url = self
                .app_origin
                .join(path)
                .map_err(|err| GatewayError::Install(format!("bad precache path {path}: {err}")))?;
            let request = FetchRequest::get(url);
            let response = self.upstream.fetch(&request).await.map_err(|err| {
                GatewayError::Install(format!("precache fetch for {} failed: {err}", request.url))
            })?;
            if !response.is_ok() {
                return Err(GatewayError::Install(format!(
                    "precache fetch for {} returned {}",
                    request.url, response.status
                )));
            }
            precached.push((request.url.to_string(), response));
        }

        let mut registry = self.registry.write().await;
        let store = registry.open(STATIC_STORE);
        for (url, response) in precached {
            store.put(&url, response);
        }
        drop(registry);

        self.set_state(ControllerState::Installed);
        info!(assets = PRECACHE_MANIFEST.len(), "install complete");
        Ok(())
    }

    // == Activate ==
    /// Purges stale cache generations and starts intercepting immediately.
    ///
    /// Idempotent; also triggered by the `SKIP_WAITING` control message.
    /// Returns the names of the purged stores.
    pub async fn activate(&self) -> Vec<String> {
        let purged = self.registry.write().await.purge_stale_generations();
        self.set_state(ControllerState::Activated);
        info!(
            purged = purged.len(),
            "activated, controlling all clients without reload"
        );
        purged
    }

    // == Handle ==
    /// Resolves one mediated request.
    ///
    /// Pipeline: non-http(s) URLs are rejected; non-GET requests, excluded
    /// URLs, and anything arriving before activation pass straight through;
    /// the first matching route rule picks the strategy; unmatched requests
    /// go to the default page handler.
    pub async fn handle(&self, request: &FetchRequest) -> Result<StoredResponse> {
        if !request.is_http() {
            return Err(GatewayError::InvalidRequest(format!(
                "unsupported scheme: {}",
                request.url.scheme()
            )));
        }
        if !self.state().can_intercept() || !request.is_get() || rules::is_excluded(&request.url) {
            debug!(url = %request.url, "passing through unmediated");
            return self.upstream.fetch(request).await;
        }

        match rules::classify(&request.url) {
            Some(rule) => {
                debug!(url = %request.url, strategy = %rule.strategy, store = rule.store, "dispatching");
                self.resolve(rule.strategy, rule.store, request).await
            }
            None => self.handle_page_request(request).await,
        }
    }

    // == Resolve ==
    /// Runs one strategy against a named store.
    pub async fn resolve(
        &self,
        strategy: Strategy,
        store: &'static str,
        request: &FetchRequest,
    ) -> Result<StoredResponse> {
        match strategy {
            Strategy::CacheFirst => self.cache_first(store, request).await,
            Strategy::NetworkFirst => self.network_first(store, request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(store, request).await,
            Strategy::NetworkOnly => self.upstream.fetch(request).await,
            Strategy::CacheOnly => self
                .lookup(store, request.cache_key())
                .await
                .ok_or_else(|| GatewayError::CacheMiss(request.url.to_string())),
        }
    }

    // == Clear URL ==
    /// Deletes one URL from every store (control-message command).
    pub async fn clear_url(&self, url: &str) -> bool {
        self.registry.write().await.delete_url(url)
    }

    // == Strategy Implementations ==

    async fn lookup(&self, store: &str, key: &str) -> Option<StoredResponse> {
        self.registry.write().await.open(store).get(key)
    }

    /// Writes a response copy to a store; only 2xx responses are kept.
    async fn store_response(&self, store: &str, key: &str, response: &StoredResponse) {
        if response.is_ok() {
            self.registry
                .write()
                .await
                .open(store)
                .put(key, response.clone());
        }
    }

    async fn cache_first(
        &self,
        store: &'static str,
        request: &FetchRequest,
    ) -> Result<StoredResponse> {
        if let Some(cached) = self.lookup(store, request.cache_key()).await {
            return Ok(cached);
        }
        let response = self.upstream.fetch(request).await?;
        self.store_response(store, request.cache_key(), &response)
            .await;
        Ok(response)
    }

    async fn network_first(
        &self,
        store: &'static str,
        request: &FetchRequest,
    ) -> Result<StoredResponse> {
        match self.upstream.fetch(request).await {
            Ok(response) => {
                self.store_response(store, request.cache_key(), &response)
                    .await;
                Ok(response)
            }
            Err(err) => match self.lookup(store, request.cache_key()).await {
                Some(cached) => {
                    warn!(url = %request.url, %err, "network failed, serving cached copy");
                    Ok(cached)
                }
                None => Err(err),
            },
        }
    }

    async fn stale_while_revalidate(
        &self,
        store: &'static str,
        request: &FetchRequest,
    ) -> Result<StoredResponse> {
        if let Some(cached) = self.lookup(store, request.cache_key()).await {
            self.spawn_revalidation(store, request.clone());
            return Ok(cached);
        }
        let response = self.upstream.fetch(request).await?;
        self.store_response(store, request.cache_key(), &response)
            .await;
        Ok(response)
    }

    /// Background refresh for stale-while-revalidate. Failures are logged
    /// and swallowed: the caller already holds a cached response.
    fn spawn_revalidation(&self, store: &'static str, request: FetchRequest) {
        let registry = Arc::clone(&self.registry);
        let upstream = Arc::clone(&self.upstream);
        tokio::spawn(async move {
            match upstream.fetch(&request).await {
                Ok(response) if response.is_ok() => {
                    registry
                        .write()
                        .await
                        .open(store)
                        .put(request.cache_key(), response);
                }
                Ok(response) => debug!(
                    url = %request.url,
                    status = response.status,
                    "revalidation returned non-success, keeping cached copy"
                ),
                Err(err) => debug!(url = %request.url, %err, "background revalidation failed"),
            }
        });
    }

    // == Default Page Handler ==
    /// Network first into the dynamic store; offline falls back to the
    /// cached page, then the precached offline page for navigations, then
    /// a synthetic 503 for sub-resources.
    async fn handle_page_request(&self, request: &FetchRequest) -> Result<StoredResponse> {
        match self.upstream.fetch(request).await {
            Ok(response) => {
                self.store_response(DYNAMIC_STORE, request.cache_key(), &response)
                    .await;
                Ok(response)
            }
            Err(err) => {
                if let Some(cached) = self.lookup(DYNAMIC_STORE, request.cache_key()).await {
                    warn!(url = %request.url, %err, "offline, serving cached page");
                    return Ok(cached);
                }
                if request.is_navigation {
                    if let Some(fallback) = self.offline_page().await {
                        warn!(url = %request.url, %err, "offline, serving fallback page");
                        return Ok(fallback);
                    }
                }
                warn!(url = %request.url, %err, "offline with nothing cached");
                Ok(StoredResponse::service_unavailable("offline"))
            }
        }
    }

    async fn offline_page(&self) -> Option<StoredResponse> {
        let url = self.app_origin.join(OFFLINE_PAGE).ok()?;
        self.lookup(STATIC_STORE, url.as_str()).await
    }
}

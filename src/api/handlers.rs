//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;
use url::Url;

use crate::cache::StoredResponse;
use crate::error::{GatewayError, Result};
use crate::fetch::{FetchController, FetchRequest};
use crate::models::{
    AckReply, ClearCacheReply, ControlMessage, ControlReply, FetchParams, HealthResponse,
    StatsResponse, VersionReply,
};
use crate::push::{self, Notification};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The fetch controller doing all mediation work
    pub controller: Arc<FetchController>,
}

impl AppState {
    /// Creates a new AppState around a controller.
    pub fn new(controller: Arc<FetchController>) -> Self {
        Self { controller }
    }
}

/// Handler for the mediation endpoint (ANY /fetch?url=...).
///
/// Parses the absolute target URL, derives the navigation flag from the
/// request headers, and resolves the request through the controller.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let url = Url::parse(&params.url).map_err(|err| {
        GatewayError::InvalidRequest(format!("bad url '{}': {err}", params.url))
    })?;

    let request = FetchRequest {
        method,
        url,
        is_navigation: wants_navigation(&headers),
        body: (!body.is_empty()).then_some(body),
    };

    let stored = state.controller.handle(&request).await?;
    Ok(into_http_response(stored))
}

/// Handler for POST /control.
///
/// Control messages never fail at the HTTP level; malformed payloads are
/// already rejected by the tagged-union deserializer.
pub async fn control_handler(
    State(state): State<AppState>,
    Json(message): Json<ControlMessage>,
) -> Json<ControlReply> {
    match message {
        ControlMessage::SkipWaiting => {
            state.controller.activate().await;
            Json(ControlReply::Ack(AckReply::new(true)))
        }
        ControlMessage::GetVersion => {
            let version = state.controller.version().await;
            Json(ControlReply::Version(VersionReply::new(version)))
        }
        ControlMessage::ClearCache { url } => {
            state.controller.clear_url(&url).await;
            Json(ControlReply::ClearCache(ClearCacheReply::ok()))
        }
        ControlMessage::Sync { tag } => {
            let known = push::handle_sync(&tag);
            Json(ControlReply::Ack(AckReply::new(known)))
        }
    }
}

/// Handler for POST /push.
///
/// Renders the payload into the notification that would be surfaced.
pub async fn push_handler(body: Bytes) -> Json<Notification> {
    Json(push::notification_from_payload(&body))
}

/// Handler for GET /stats.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let version = state.controller.version().await;
    let per_store = state.controller.stats().await;
    Json(StatsResponse::new(version, per_store))
}

/// Handler for GET /health.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let version = state.controller.version().await;
    Json(HealthResponse::healthy(version, state.controller.state()))
}

/// A navigation is a top-level page load: either the fetch metadata says
/// so, or the client primarily accepts HTML.
fn wants_navigation(headers: &HeaderMap) -> bool {
    if headers
        .get("sec-fetch-mode")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|mode| mode == "navigate")
    {
        return true;
    }
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Materializes a stored snapshot into an HTTP response.
fn into_http_response(stored: StoredResponse) -> Response {
    let status = StatusCode::from_u16(stored.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut builder = axum::http::Response::builder().status(status);
    for (name, value) in &stored.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Body::from(stored.body))
        .unwrap_or_else(|err| {
            error!(%err, "failed to materialize cached response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

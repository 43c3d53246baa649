//! Error types for the caching gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Gateway Error Enum ==
/// Unified error type for the caching gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No cached entry exists for the requested URL
    #[error("No cached entry for: {0}")]
    CacheMiss(String),

    /// Invalid request data (malformed URL, unsupported scheme, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream fetch failed (network unreachable, connection refused, ...)
    #[error("Upstream fetch failed: {0}")]
    Upstream(String),

    /// Install-time precache failed; the gateway must not start serving
    #[error("Install failed: {0}")]
    Install(String),

    /// Internal gateway error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::CacheMiss(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            GatewayError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GatewayError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            GatewayError::Install(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            GatewayError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;

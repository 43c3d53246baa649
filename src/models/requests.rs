//! Request DTOs for the gateway control plane
//!
//! Control messages are a closed tagged union validated at the boundary;
//! unknown shapes are rejected at deserialization time.

use serde::Deserialize;

/// Control message accepted on `POST /control`.
///
/// - `SKIP_WAITING` — activate the current generation immediately
/// - `GET_VERSION` — report the current cache generation tag
/// - `CLEAR_CACHE` — delete one URL from every store
/// - `SYNC` — background-sync wakeup for a registered tag
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    SkipWaiting,
    GetVersion,
    ClearCache { url: String },
    Sync { tag: String },
}

/// Query parameters of the fetch mediation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchParams {
    /// Absolute URL to mediate
    pub url: String,
}

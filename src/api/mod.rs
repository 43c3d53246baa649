//! API Module
//!
//! HTTP handlers and routing for the gateway.
//!
//! # Endpoints
//! - `ANY /fetch?url=...` - Mediate a request through the caching strategies
//! - `POST /control` - Control messages (skip waiting, version, clear cache, sync)
//! - `POST /push` - Render a push payload into its notification
//! - `GET /stats` - Per-store cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

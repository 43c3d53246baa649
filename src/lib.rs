//! Destinos Gateway - an offline-first HTTP caching gateway
//!
//! Mediates outbound requests through per-route caching strategies over
//! versioned in-memory stores, and ships the in-process view-data cache
//! with its cross-component invalidation bus.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod push;
pub mod viewcache;

pub use api::AppState;
pub use config::Config;
pub use fetch::FetchController;

//! View Data Cache Module
//!
//! In-process memoization for view-model data fetching, plus the
//! invalidation bus that lets a mutation in one part of the application
//! tell another part that its cached copy is stale. Deliberately
//! independent from the HTTP-level caching in [`crate::fetch`]: this layer
//! memoizes loader results per consumer, not network responses per URL.

mod bus;
mod loader;

pub use bus::InvalidationBus;
pub use loader::{LoadError, ViewData};

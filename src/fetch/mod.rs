//! Fetch Mediation Module
//!
//! Everything between an outbound request and its response: route
//! classification, the five caching strategies, the lifecycle-aware
//! controller, and the upstream network seam.

mod controller;
mod rules;
mod strategy;
mod upstream;

pub use controller::{
    ControllerState, FetchController, DYNAMIC_STORE, OFFLINE_PAGE, PRECACHE_MANIFEST, STATIC_STORE,
};
pub use rules::{classify, is_excluded, RoutePattern, RouteRule, ROUTE_RULES};
pub use strategy::Strategy;
pub use upstream::{FetchRequest, HttpUpstream, Upstream};

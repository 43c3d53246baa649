//! Caching strategies for mediated fetches.
//!
//! Every mediated request resolves through exactly one of five strategies,
//! selected by the route table in [`crate::fetch::rules`]. The enum replaces
//! ad hoc per-route handler functions with an explicit, type-safe choice.
//!
//! | Strategy | Cache hit | Cache miss | Network failure |
//! |----------|-----------|------------|-----------------|
//! | `CacheFirst` | return cached | fetch, store 2xx | propagate |
//! | `NetworkFirst` | (network tried first) | fetch, store 2xx | cached fallback, else propagate |
//! | `StaleWhileRevalidate` | return cached, refresh in background | fetch, store 2xx | propagate (miss) / swallow (background) |
//! | `NetworkOnly` | never read | fetch | propagate |
//! | `CacheOnly` | return cached | error | never touched |

// == Strategy ==
/// Per-route caching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve from cache when present; otherwise fetch and cache.
    CacheFirst,
    /// Fetch from network; fall back to cache when the network fails.
    NetworkFirst,
    /// Serve the cached copy immediately and refresh it in the background.
    StaleWhileRevalidate,
    /// Always fetch; never read or write any store.
    NetworkOnly,
    /// Only ever read the store; never touch the network.
    CacheOnly,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::CacheFirst => write!(f, "cache-first"),
            Strategy::NetworkFirst => write!(f, "network-first"),
            Strategy::StaleWhileRevalidate => write!(f, "stale-while-revalidate"),
            Strategy::NetworkOnly => write!(f, "network-only"),
            Strategy::CacheOnly => write!(f, "cache-only"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::CacheFirst.to_string(), "cache-first");
        assert_eq!(Strategy::NetworkFirst.to_string(), "network-first");
        assert_eq!(
            Strategy::StaleWhileRevalidate.to_string(),
            "stale-while-revalidate"
        );
        assert_eq!(Strategy::NetworkOnly.to_string(), "network-only");
        assert_eq!(Strategy::CacheOnly.to_string(), "cache-only");
    }

    #[test]
    fn test_strategy_equality() {
        assert_eq!(Strategy::CacheFirst, Strategy::CacheFirst);
        assert_ne!(Strategy::CacheFirst, Strategy::NetworkFirst);
    }
}

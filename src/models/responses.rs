//! Response DTOs for the gateway control plane
//!
//! Defines the structure of outgoing JSON reply bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Reply to `GET_VERSION`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionReply {
    /// Current cache generation tag
    pub version: String,
}

impl VersionReply {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

/// Reply to `CLEAR_CACHE`.
#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClearCacheReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }
}

/// Generic acknowledgement (`SKIP_WAITING`, `SYNC`).
#[derive(Debug, Clone, Serialize)]
pub struct AckReply {
    pub acknowledged: bool,
}

impl AckReply {
    pub fn new(acknowledged: bool) -> Self {
        Self { acknowledged }
    }
}

/// Union of control replies; serialized as the bare inner shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ControlReply {
    Version(VersionReply),
    ClearCache(ClearCacheReply),
    Ack(AckReply),
}

/// One store's statistics in the stats response.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatsEntry {
    pub name: String,
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub hit_rate: f64,
}

impl StoreStatsEntry {
    pub fn new(name: impl Into<String>, stats: &CacheStats) -> Self {
        Self {
            name: name.into(),
            hits: stats.hits,
            misses: stats.misses,
            entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Current cache generation tag
    pub version: String,
    /// Per-store breakdown
    pub stores: Vec<StoreStatsEntry>,
    /// Aggregate hits across all stores
    pub hits: u64,
    /// Aggregate misses across all stores
    pub misses: u64,
    /// Aggregate entry count across all stores
    pub entries: usize,
    /// Aggregate hit rate
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Builds the aggregate view from per-store statistics.
    pub fn new(version: impl Into<String>, per_store: Vec<(String, CacheStats)>) -> Self {
        let stores: Vec<StoreStatsEntry> = per_store
            .iter()
            .map(|(name, stats)| StoreStatsEntry::new(name, stats))
            .collect();
        let hits: u64 = stores.iter().map(|s| s.hits).sum();
        let misses: u64 = stores.iter().map(|s| s.misses).sum();
        let entries: usize = stores.iter().map(|s| s.entries).sum();
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };
        Self {
            version: version.into(),
            stores,
            hits,
            misses,
            entries,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g. "healthy")
    pub status: String,
    /// Current cache generation tag
    pub version: String,
    /// Lifecycle state of the controller
    pub state: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a healthy response with the current timestamp.
    pub fn healthy(version: impl Into<String>, state: impl ToString) -> Self {
        Self {
            status: "healthy".to_string(),
            version: version.into(),
            state: state.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_reply_serialize() {
        let json = serde_json::to_string(&ControlReply::Version(VersionReply::new("v3"))).unwrap();
        assert_eq!(json, r#"{"version":"v3"}"#);
    }

    #[test]
    fn test_clear_cache_reply_omits_absent_error() {
        let json =
            serde_json::to_string(&ControlReply::ClearCache(ClearCacheReply::ok())).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }

    #[test]
    fn test_ack_reply_serialize() {
        let json = serde_json::to_string(&ControlReply::Ack(AckReply::new(true))).unwrap();
        assert_eq!(json, r#"{"acknowledged":true}"#);
    }

    #[test]
    fn test_stats_response_aggregates() {
        let mut a = CacheStats::new();
        a.record_hit();
        a.record_hit();
        a.set_total_entries(2);
        let mut b = CacheStats::new();
        b.record_miss();
        b.set_total_entries(1);

        let resp = StatsResponse::new(
            "v1",
            vec![("images-v1".to_string(), a), ("fonts-v1".to_string(), b)],
        );
        assert_eq!(resp.hits, 2);
        assert_eq!(resp.misses, 1);
        assert_eq!(resp.entries, 3);
        assert!((resp.hit_rate - 2.0 / 3.0).abs() < 0.001);
        assert_eq!(resp.stores.len(), 2);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new("v1", vec![]);
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy("v1", "activated");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("activated"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}

//! Stored Response Module
//!
//! Defines the snapshot format for cached HTTP responses.

use bytes::Bytes;
use chrono::{DateTime, Utc};

// == Stored Response ==
/// An HTTP response snapshot held by a cache store.
///
/// Bodies are `Bytes` so cloning a snapshot out of a store is cheap.
#[derive(Debug, Clone)]
pub struct StoredResponse {
    /// HTTP status code
    pub status: u16,
    /// End-to-end response headers (name, value)
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Bytes,
    /// When the snapshot was taken
    pub stored_at: DateTime<Utc>,
}

impl StoredResponse {
    // == Constructor ==
    /// Creates a new response snapshot.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            stored_at: Utc::now(),
        }
    }

    /// Creates the synthetic 503 served when a sub-resource is requested
    /// while offline and nothing cached can answer it.
    pub fn service_unavailable(reason: &str) -> Self {
        Self::new(
            503,
            vec![("content-type".to_string(), "text/plain".to_string())],
            reason.as_bytes().to_vec(),
        )
    }

    // == Is Ok ==
    /// True for successful (2xx) responses. Only these are ever written to
    /// a store.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Size of the body in bytes.
    pub fn body_size(&self) -> usize {
        self.body.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_creation() {
        let resp = StoredResponse::new(200, vec![], "hello");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body.as_ref(), b"hello");
        assert!(resp.is_ok());
    }

    #[test]
    fn test_is_ok_boundaries() {
        assert!(StoredResponse::new(200, vec![], "").is_ok());
        assert!(StoredResponse::new(299, vec![], "").is_ok());
        assert!(!StoredResponse::new(199, vec![], "").is_ok());
        assert!(!StoredResponse::new(300, vec![], "").is_ok());
        assert!(!StoredResponse::new(404, vec![], "").is_ok());
        assert!(!StoredResponse::new(503, vec![], "").is_ok());
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let resp = StoredResponse::new(
            200,
            vec![("Content-Type".to_string(), "image/png".to_string())],
            "",
        );
        assert_eq!(resp.header("content-type"), Some("image/png"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("image/png"));
        assert_eq!(resp.header("etag"), None);
    }

    #[test]
    fn test_service_unavailable_shape() {
        let resp = StoredResponse::service_unavailable("offline");
        assert_eq!(resp.status, 503);
        assert!(!resp.is_ok());
        assert_eq!(resp.body.as_ref(), b"offline");
        assert_eq!(resp.header("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_body_size() {
        let resp = StoredResponse::new(200, vec![], vec![0u8; 42]);
        assert_eq!(resp.body_size(), 42);
    }
}

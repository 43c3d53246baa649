//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache generation tag; stores from other generations are purged on activation
    pub cache_version: String,
    /// Origin of the application the gateway fronts (precache + offline fallback)
    pub app_origin: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_VERSION` - cache generation tag (default: "v1")
    /// - `APP_ORIGIN` - application origin (default: "http://localhost:8080")
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cache_version: env::var("CACHE_VERSION").unwrap_or_else(|_| "v1".to_string()),
            app_origin: env::var("APP_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_version: "v1".to_string(),
            app_origin: "http://localhost:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_version, "v1");
        assert_eq!(config.app_origin, "http://localhost:8080");
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("CACHE_VERSION");
        env::remove_var("APP_ORIGIN");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache_version, "v1");
        assert_eq!(config.app_origin, "http://localhost:8080");
    }
}

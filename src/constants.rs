//! Application-wide constants and configuration values
//!
//! This module centralizes magic numbers and names shared across the client,
//! the cache layer and the CLI.

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of idle connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 16;

/// Header carrying the API key on every request
pub const API_KEY_HEADER: &str = "x-apisports-key";

/// Directory name used under the platform config and cache directories
pub const APP_DIR_NAME: &str = "sports_api_client";

/// Default log file name
pub const LOG_FILE_NAME: &str = "sports_api_client.log";

/// Cache TTL (Time To Live) values
pub mod cache_ttl {
    /// Default store-wide TTL in seconds (5 minutes)
    pub const DEFAULT_SECONDS: u64 = 300;

    /// Default store-wide TTL in milliseconds, the unit entry timestamps use
    pub const DEFAULT_MILLIS: u64 = 300_000;
}

/// Persisted cache document layout
pub mod persistence {
    /// Version written into every persisted cache document
    pub const DOCUMENT_VERSION: u32 = 0;

    /// Field inside `state` holding the TTL in milliseconds
    pub const TTL_FIELD: &str = "cacheTTL";

    /// Suffix of the per-sport store name, e.g. `baseball-cache`
    pub const STORE_NAME_SUFFIX: &str = "cache";

    /// Extension used by the file storage adapter
    pub const FILE_EXTENSION: &str = "json";
}

/// Environment variable names
pub mod env_vars {
    /// Environment variable for the API key
    pub const API_KEY: &str = "SPORTS_API_KEY";

    /// Environment variable overriding the per-sport base URL
    pub const API_BASE_URL: &str = "SPORTS_API_BASE_URL";

    /// Environment variable for log file path override
    pub const LOG_FILE: &str = "SPORTS_API_LOG_FILE";

    /// Environment variable for HTTP timeout in seconds
    pub const HTTP_TIMEOUT: &str = "SPORTS_API_HTTP_TIMEOUT";

    /// Environment variable for the cache TTL in seconds
    pub const CACHE_TTL: &str = "SPORTS_API_CACHE_TTL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_constants_agree() {
        assert_eq!(
            cache_ttl::DEFAULT_SECONDS * 1000,
            cache_ttl::DEFAULT_MILLIS
        );
    }

    #[test]
    fn test_env_var_names_are_not_empty() {
        let names = [
            env_vars::API_KEY,
            env_vars::API_BASE_URL,
            env_vars::LOG_FILE,
            env_vars::HTTP_TIMEOUT,
            env_vars::CACHE_TTL,
        ];
        for name in names {
            assert!(!name.is_empty());
            assert!(name.starts_with("SPORTS_API_"));
        }
    }

    #[test]
    fn test_http_constants_are_reasonable() {
        assert!(DEFAULT_HTTP_TIMEOUT_SECONDS > 0);
        assert!(HTTP_POOL_MAX_IDLE_PER_HOST > 0);
        assert_eq!(API_KEY_HEADER, API_KEY_HEADER.to_lowercase());
    }
}

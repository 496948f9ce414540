//! Store configuration.
//!
//! Configuration is loaded from environment variables with defaults
//! suitable for local development.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Configuration for the loader and the lookup cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Redis URL for the lookup cache. No cache is used when unset.
    pub redis_url: Option<String>,

    /// Key prefix for cache entries.
    pub cache_prefix: String,

    /// Lifetime of a cache entry in seconds.
    pub cache_ttl_secs: u64,

    /// Treat an empty permission, resource type, resource or role table as
    /// unreadable.
    pub strict_bootstrap: bool,
}

impl Default for StoreConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            redis_url: None,
            cache_prefix: "acl".to_string(),
            cache_ttl_secs: 300,
            strict_bootstrap: true,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ACL_REDIS_URL`: Redis URL for the lookup cache (default: none)
    /// - `ACL_CACHE_PREFIX`: Cache key prefix (default: acl)
    /// - `ACL_CACHE_TTL_SECS`: Cache entry lifetime in seconds (default: 300)
    /// - `ACL_STRICT_BOOTSTRAP`: Reject empty core tables (default: true)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            redis_url: std::env::var("ACL_REDIS_URL").ok().filter(|s| !s.is_empty()),
            cache_prefix: std::env::var("ACL_CACHE_PREFIX").unwrap_or(default.cache_prefix),
            cache_ttl_secs: std::env::var("ACL_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.cache_ttl_secs),
            strict_bootstrap: std::env::var("ACL_STRICT_BOOTSTRAP")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(default.strict_bootstrap),
        }
    }

    /// Cache entry lifetime as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_prefix.is_empty() || self.cache_prefix.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                key: "ACL_CACHE_PREFIX".to_string(),
                message: "must be non-empty and contain no whitespace".to_string(),
            });
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ACL_CACHE_TTL_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if let Some(ref url) = self.redis_url {
            let supported = ["redis://", "rediss://", "redis+unix://", "unix://"];
            if !supported.iter().any(|scheme| url.starts_with(scheme)) {
                return Err(ConfigError::InvalidValue {
                    key: "ACL_REDIS_URL".to_string(),
                    message: format!("unsupported scheme in {url}"),
                });
            }
        }
        Ok(())
    }

    /// Require a Redis URL (for deployments that depend on the cache).
    pub fn require_redis_url(&self) -> Result<&str, ConfigError> {
        self.redis_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("ACL_REDIS_URL".to_string()))
    }
}

//! Redis-backed lookup cache for distributed deployments.
//!
//! Several instances can share one resource-name index. Entries expire
//! after the configured TTL, so a cache that misses a rename or removal
//! heals on its own; callers validate hits against the graph regardless.

use acl_graph::ResourceId;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, LookupCache};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Redis lookup cache.
///
/// Keys have the form `{prefix}:resource:{name}` and hold the resource id.
///
/// # Example
///
/// ```rust,no_run
/// use acl_store::RedisLookupCache;
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = RedisLookupCache::new("redis://localhost:6379", "acl", 300).await?;
///     Ok(())
/// }
/// ```
pub struct RedisLookupCache {
    /// Redis client
    client: Client,

    /// Key prefix for all Redis operations
    prefix: String,

    /// Entry lifetime in seconds
    ttl_secs: u64,

    /// Cache statistics
    stats: Arc<RwLock<CacheStats>>,
}

impl std::fmt::Debug for RedisLookupCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLookupCache")
            .field("prefix", &self.prefix)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl RedisLookupCache {
    /// Create a new Redis lookup cache.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., `redis://localhost:6379`)
    /// * `prefix` - Key prefix for Redis operations (e.g., `acl`)
    /// * `ttl_secs` - Entry lifetime in seconds
    ///
    /// # Returns
    ///
    /// A new `RedisLookupCache` or an error if the server is unreachable
    pub async fn new(redis_url: &str, prefix: &str, ttl_secs: u64) -> StoreResult<Self> {
        let client = Client::open(redis_url).map_err(|e| StoreError::Cache(e.to_string()))?;

        // Test connection
        let _ = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Cache(e.to_string()))?;

        Ok(Self {
            client,
            prefix: prefix.to_string(),
            ttl_secs,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        })
    }

    /// Create a cache from configuration.
    ///
    /// # Errors
    ///
    /// `Config` if the configuration is invalid or has no Redis URL.
    pub async fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let url = config.require_redis_url()?;
        Self::new(url, &config.cache_prefix, config.cache_ttl_secs).await
    }

    fn key(&self, name: &str) -> String {
        format!("{}:resource:{}", self.prefix, name)
    }

    /// Get a Redis connection.
    async fn get_connection(&self) -> StoreResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Cache(e.to_string()))
    }
}

#[async_trait]
impl LookupCache for RedisLookupCache {
    async fn get(&self, name: &str) -> StoreResult<Option<ResourceId>> {
        let mut conn = self.get_connection().await?;
        let found: Option<i64> = conn
            .get(self.key(name))
            .await
            .map_err(|e| StoreError::Cache(e.to_string()))?;

        let mut stats = self.stats.write().await;
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        Ok(found.map(ResourceId))
    }

    async fn put(&self, name: &str, id: ResourceId) -> StoreResult<()> {
        let mut conn = self.get_connection().await?;
        redis::cmd("SET")
            .arg(self.key(name))
            .arg(id.get())
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| StoreError::Cache(e.to_string()))?;

        self.stats.write().await.writes += 1;
        Ok(())
    }

    async fn invalidate(&self, name: &str) -> StoreResult<()> {
        let mut conn = self.get_connection().await?;
        let removed: i64 = conn
            .del(self.key(name))
            .await
            .map_err(|e| StoreError::Cache(e.to_string()))?;

        if removed > 0 {
            self.stats.write().await.invalidations += 1;
        }
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut conn = self.get_connection().await?;
        let pattern = format!("{}:resource:*", self.prefix);
        // SCAN rather than KEYS so a large keyspace does not block the server
        let keys: Vec<String> = {
            let mut iter = conn
                .scan_match::<_, String>(&pattern)
                .await
                .map_err(|e| StoreError::Cache(e.to_string()))?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        if !keys.is_empty() {
            conn.del::<_, ()>(keys)
                .await
                .map_err(|e| StoreError::Cache(e.to_string()))?;
        }
        tracing::debug!(pattern = %pattern, "Cleared Redis lookup cache");
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}

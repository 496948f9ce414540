//! Lookup cache abstraction.
//!
//! The cache is an optional name -> resource id index in front of the
//! graph. It is never authoritative: entries may be missing or stale, and
//! callers must validate every hit against the live graph.

use acl_graph::ResourceId;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::StoreResult;

/// Name -> resource id index.
#[async_trait]
pub trait LookupCache: Send + Sync {
    /// Look up a resource id by name.
    async fn get(&self, name: &str) -> StoreResult<Option<ResourceId>>;

    /// Store a name -> id entry.
    async fn put(&self, name: &str, id: ResourceId) -> StoreResult<()>;

    /// Drop a single entry.
    async fn invalidate(&self, name: &str) -> StoreResult<()>;

    /// Drop every entry.
    async fn clear(&self) -> StoreResult<()>;

    /// Get cache statistics.
    async fn stats(&self) -> CacheStats;
}

/// Lookup cache statistics.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry
    pub hits: u64,

    /// Lookups that found nothing
    pub misses: u64,

    /// Entries written
    pub writes: u64,

    /// Entries dropped through `invalidate`
    pub invalidations: u64,
}

/// In-memory lookup cache for single-process deployments.
#[derive(Clone, Default)]
pub struct MemoryLookupCache {
    entries: Arc<RwLock<HashMap<String, ResourceId>>>,
    stats: Arc<RwLock<CacheStats>>,
}

impl std::fmt::Debug for MemoryLookupCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLookupCache").finish_non_exhaustive()
    }
}

impl MemoryLookupCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl LookupCache for MemoryLookupCache {
    async fn get(&self, name: &str) -> StoreResult<Option<ResourceId>> {
        let found = self.entries.read().await.get(name).copied();

        let mut stats = self.stats.write().await;
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        Ok(found)
    }

    async fn put(&self, name: &str, id: ResourceId) -> StoreResult<()> {
        self.entries.write().await.insert(name.to_string(), id);
        self.stats.write().await.writes += 1;
        Ok(())
    }

    async fn invalidate(&self, name: &str) -> StoreResult<()> {
        if self.entries.write().await.remove(name).is_some() {
            self.stats.write().await.invalidations += 1;
        }
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}

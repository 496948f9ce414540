//! # Access-Control Store
//!
//! This crate provides the collaborators around the in-memory authorization
//! graph: the bootstrap loader that builds it from durable storage, and the
//! optional name -> id lookup cache in front of it.
//!
//! ## Overview
//!
//! The acl-store crate handles:
//! - **Tables**: Row shapes of the seven persisted authorization tables
//! - **Data Store**: Async read access to those tables
//! - **Loader**: All-or-nothing graph bootstrap and snapshot reload
//! - **Lookup Cache**: Resource name index, in memory or in Redis
//! - **Resolver**: Name-based permission checks validated against the graph
//!
//! ## Features
//!
//! - `redis`: Redis-backed lookup cache for distributed deployments
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acl_store::{GraphLoader, MemoryDataStore, MemoryLookupCache, ResourceResolver, StoreConfig};
//! use std::sync::Arc;
//!
//! async fn bootstrap_example(tables_json: &str) -> Result<(), acl_store::StoreError> {
//!     let config = StoreConfig::from_env();
//!     config.validate()?;
//!
//!     let store = Arc::new(MemoryDataStore::from_json(tables_json)?);
//!     let loader = GraphLoader::new(store, config);
//!
//!     // Nothing is served until the whole graph is built
//!     let (graph, report) = loader.bootstrap().await?;
//!     println!("snapshot {} with {} roles", report.snapshot_id, report.stats.roles);
//!
//!     let cache = Arc::new(MemoryLookupCache::new());
//!     loader.warm_cache(&graph, cache.as_ref()).await?;
//!
//!     let resolver = ResourceResolver::new(graph.clone()).with_cache(cache);
//!     let allowed = resolver.has_permission_named(1.into(), "Doc1", "read").await?;
//!     println!("allowed: {allowed}");
//!
//!     // Later: rebuild from storage and swap in atomically
//!     loader.reload_into(&graph).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Model
//!
//! - An unreadable table, or a row the graph rejects, fails the whole load
//! - A failed reload leaves the previous graph live
//! - Cache errors are logged and the graph answers instead

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod resolver;
pub mod store;
pub mod tables;

#[cfg(feature = "redis")]
pub mod redis;

// Re-export main types
pub use cache::{CacheStats, LookupCache, MemoryLookupCache};
pub use config::{ConfigError, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use loader::{build_graph, GraphLoader, LoadReport};
pub use resolver::ResourceResolver;
pub use store::{DataStore, MemoryDataStore};
pub use tables::{
    GroupResourceRow, PermissionRow, ResourceRow, ResourceTypeRow, RoleMemberOfRow, RolePermissionResourceRow,
    RoleRow, Table, Tables,
};

#[cfg(feature = "redis")]
pub use crate::redis::RedisLookupCache;

//! # Graph loader
//!
//! Builds an [`AuthorizationGraph`] from the persisted tables.
//!
//! ## Load sequence
//!
//! ```text
//! read all tables ─→ strict check ─→ permissions & resource types
//!                                  ─→ resources ─→ group members
//!                                  ─→ roles ─→ parent edges ─→ grants
//! ```
//!
//! Every table is read before the first entity is built, and the graph is
//! only published once it is complete. A failed load leaves whatever graph
//! was live before untouched.

use acl_graph::{
    AuthorizationGraph, GraphStats, Permission, PermissionId, Resource, ResourceId, ResourceType, Role,
    RoleId, SharedGraph,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::cache::LookupCache;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::DataStore;
use crate::tables::{Table, Tables};

/// Summary of one successful load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Unique id of the built snapshot
    pub snapshot_id: Uuid,

    /// When the snapshot finished building
    pub loaded_at: DateTime<Utc>,

    /// Rows read per table
    pub rows: BTreeMap<&'static str, usize>,

    /// Entity counts of the built graph
    pub stats: GraphStats,

    /// Wall time of the whole load in milliseconds
    pub elapsed_ms: u64,
}

impl LoadReport {
    fn new(tables: &Tables, stats: GraphStats, started: Instant) -> Self {
        Self {
            snapshot_id: Uuid::now_v7(),
            loaded_at: Utc::now(),
            rows: Table::ALL
                .into_iter()
                .map(|t| (t.as_str(), tables.row_count(t)))
                .collect(),
            stats,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Loads the authorization graph from a [`DataStore`].
///
/// # Example
///
/// ```
/// use acl_store::{GraphLoader, MemoryDataStore, StoreConfig};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), acl_store::StoreError> {
/// let store = Arc::new(MemoryDataStore::from_json(r#"{
///     "permission": [{"id": 1, "name": "read", "resource_type_id": 1}],
///     "resource_type": [{"id": 1, "name": "document"}],
///     "resource": [{"id": 1, "name": "Doc1", "resource_type_id": 1}],
///     "role": [{"id": 1, "name": "Viewer"}],
///     "role_permission_resource": [{"role_id": 1, "resource_id": 1, "permission_id": 1}]
/// }"#)?);
///
/// let loader = GraphLoader::new(store, StoreConfig::default());
/// let (graph, report) = loader.bootstrap().await?;
/// assert_eq!(report.stats.grants, 1);
/// assert!(graph.has_permission_named(1.into(), 1.into(), "read")?);
/// # Ok(())
/// # }
/// ```
pub struct GraphLoader {
    store: Arc<dyn DataStore>,
    config: StoreConfig,
}

impl std::fmt::Debug for GraphLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GraphLoader {
    /// Create a loader reading from `store`.
    pub fn new(store: Arc<dyn DataStore>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    /// The loader's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read every table and build a fresh graph.
    ///
    /// # Errors
    ///
    /// * `TableUnavailable` if a table cannot be read, or a required table is
    ///   empty in strict mode
    /// * `Graph` if a row is rejected by the graph (unknown reference, cycle,
    ///   foreign permission, ...)
    pub async fn load(&self) -> StoreResult<(AuthorizationGraph, LoadReport)> {
        let started = Instant::now();

        let tables = self.store.read_all().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read authorization tables");
            e
        })?;

        if self.config.strict_bootstrap {
            if let Some(table) = tables.first_empty_required() {
                tracing::error!(table = %table, "Required authorization table is empty");
                return Err(StoreError::TableUnavailable {
                    table: table.as_str(),
                    reason: "table is empty".to_string(),
                });
            }
        }

        let graph = build_graph(&tables).map_err(|e| {
            tracing::error!(error = %e, "Failed to build authorization graph");
            e
        })?;

        let report = LoadReport::new(&tables, graph.stats(), started);
        tracing::info!(
            snapshot = %report.snapshot_id,
            roles = report.stats.roles,
            resources = report.stats.resources,
            grants = report.stats.grants,
            elapsed_ms = report.elapsed_ms,
            "Loaded authorization graph"
        );
        Ok((graph, report))
    }

    /// Load the graph and wrap it for sharing.
    pub async fn bootstrap(&self) -> StoreResult<(SharedGraph, LoadReport)> {
        let (graph, report) = self.load().await?;
        Ok((SharedGraph::new(graph), report))
    }

    /// Load a fresh graph and swap it into `shared`.
    ///
    /// Readers keep seeing the old graph until the new one is complete. On
    /// failure the old graph stays in place.
    pub async fn reload_into(&self, shared: &SharedGraph) -> StoreResult<LoadReport> {
        let (graph, report) = self.load().await?;
        shared.replace(graph);
        tracing::info!(snapshot = %report.snapshot_id, "Replaced live authorization graph");
        Ok(report)
    }

    /// Seed `cache` with every resource name in `graph`.
    ///
    /// # Returns
    ///
    /// The number of entries written
    pub async fn warm_cache(&self, graph: &SharedGraph, cache: &dyn LookupCache) -> StoreResult<usize> {
        // collect first: the graph lock must not be held across an await
        let entries: Vec<(String, ResourceId)> = graph
            .read()
            .resources()
            .map(|r| (r.name.clone(), r.id))
            .collect();

        for (name, id) in &entries {
            cache.put(name, *id).await?;
        }
        tracing::debug!(entries = entries.len(), "Warmed resource lookup cache");
        Ok(entries.len())
    }
}

/// Build a graph from a complete set of rows.
///
/// Rows are applied in dependency order. The first rejected row aborts the
/// build and the partial graph is dropped.
pub fn build_graph(tables: &Tables) -> StoreResult<AuthorizationGraph> {
    let mut graph = AuthorizationGraph::new();

    for row in &tables.resource_type {
        graph
            .add_resource_type(ResourceType::new(row.id, &row.name).with_description(&row.description))
            .map_err(StoreError::in_table(Table::ResourceType.as_str()))?;
    }

    for row in &tables.permission {
        graph
            .add_permission(
                Permission::new(row.id, &row.name, row.resource_type_id).with_description(&row.description),
            )
            .map_err(StoreError::in_table(Table::Permission.as_str()))?;
    }

    // plain resources first, then groups
    let (groups, plain): (Vec<_>, Vec<_>) = tables.resource.iter().partition(|r| r.is_group);
    for row in plain.into_iter().chain(groups) {
        let resource = if row.is_group {
            Resource::group(row.id, &row.name, row.resource_type_id)
        } else {
            Resource::new(row.id, &row.name, row.resource_type_id)
        };
        graph
            .register_resource(resource.with_content_id(&row.content_id))
            .map_err(StoreError::in_table(Table::Resource.as_str()))?;
    }

    for row in &tables.group_resource {
        graph
            .add_member(row.group_id, row.member_resource_id)
            .map_err(StoreError::in_table(Table::GroupResource.as_str()))?;
    }

    for row in &tables.role {
        graph
            .register_role(Role::new(row.id, &row.name).with_login(row.is_login))
            .map_err(StoreError::in_table(Table::Role.as_str()))?;
    }

    for row in &tables.role_memberof {
        graph
            .add_parent(row.child_role_id, row.parent_role_id)
            .map_err(StoreError::in_table(Table::RoleMemberOf.as_str()))?;
    }

    // one row per permission; a grant is the whole set for a (role, resource)
    let mut grants: BTreeMap<(RoleId, ResourceId), Vec<PermissionId>> = BTreeMap::new();
    for row in &tables.role_permission_resource {
        grants
            .entry((row.role_id, row.resource_id))
            .or_default()
            .push(row.permission_id);
    }
    for ((role, resource), permissions) in grants {
        graph
            .grant(role, resource, permissions)
            .map_err(StoreError::in_table(Table::RolePermissionResource.as_str()))?;
    }

    Ok(graph)
}

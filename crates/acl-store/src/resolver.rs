//! Resource name resolution.
//!
//! Request handlers usually know a resource by name. [`ResourceResolver`]
//! turns the name into an id, asking the lookup cache first and the graph
//! second. The graph is the only source of truth: a cached id is used only
//! after the graph confirms it still names the same resource.

use acl_graph::{AclError, PermissionId, ResourceId, RoleId, SharedGraph};
use std::sync::Arc;

use crate::cache::LookupCache;
use crate::error::StoreResult;

/// Resolves resource names against a live graph, with an optional cache.
///
/// Cache failures are logged and never fail a lookup.
#[derive(Clone)]
pub struct ResourceResolver {
    graph: SharedGraph,
    cache: Option<Arc<dyn LookupCache>>,
}

impl std::fmt::Debug for ResourceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceResolver")
            .field("graph", &self.graph)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl ResourceResolver {
    /// Create a resolver without a cache.
    pub fn new(graph: SharedGraph) -> Self {
        Self { graph, cache: None }
    }

    /// Put a lookup cache in front of the graph.
    pub fn with_cache(mut self, cache: Arc<dyn LookupCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The graph being resolved against.
    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    /// Resolve a resource name to its id.
    ///
    /// # Returns
    ///
    /// `None` if no registered resource has that name
    pub async fn resolve(&self, name: &str) -> Option<ResourceId> {
        let Some(cache) = &self.cache else {
            return self.lookup_in_graph(name);
        };

        match cache.get(name).await {
            Ok(Some(id)) if self.names(id, name) => return Some(id),
            Ok(Some(stale)) => {
                tracing::debug!(name = %name, resource = %stale, "Dropping stale lookup cache entry");
                if let Err(e) = cache.invalidate(name).await {
                    tracing::warn!(error = %e, name = %name, "Failed to invalidate lookup cache entry");
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, name = %name, "Lookup cache read failed, falling back to graph");
            }
        }

        let id = self.lookup_in_graph(name)?;
        if let Err(e) = cache.put(name, id).await {
            tracing::warn!(error = %e, name = %name, "Failed to populate lookup cache");
        }
        Some(id)
    }

    /// Check a permission with the resource given by name.
    ///
    /// An unknown resource name yields `false`.
    ///
    /// # Errors
    ///
    /// `UnknownRole` if the role is not registered.
    pub async fn has_permission(
        &self,
        role: RoleId,
        resource_name: &str,
        permission: PermissionId,
    ) -> StoreResult<bool> {
        match self.resolve(resource_name).await {
            Some(resource) => Ok(self.graph.has_permission(role, resource, permission)?),
            None => self.require_role(role).map(|_| false),
        }
    }

    /// Like [`ResourceResolver::has_permission`], with the permission given
    /// by name as well.
    pub async fn has_permission_named(
        &self,
        role: RoleId,
        resource_name: &str,
        permission: &str,
    ) -> StoreResult<bool> {
        match self.resolve(resource_name).await {
            Some(resource) => Ok(self.graph.has_permission_named(role, resource, permission)?),
            None => self.require_role(role).map(|_| false),
        }
    }

    fn lookup_in_graph(&self, name: &str) -> Option<ResourceId> {
        self.graph.read().resource_by_name(name).map(|r| r.id)
    }

    fn names(&self, id: ResourceId, name: &str) -> bool {
        self.graph.read().resource(id).is_some_and(|r| r.name == name)
    }

    fn require_role(&self, role: RoleId) -> StoreResult<()> {
        if self.graph.read().role(role).is_none() {
            return Err(AclError::UnknownRole(role).into());
        }
        Ok(())
    }
}

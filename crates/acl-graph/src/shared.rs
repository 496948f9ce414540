//! Thread-safe handle to a live authorization graph
//!
//! Readers share a read lock and run concurrently; every structural
//! mutation holds the write lock for its whole duration, so readers observe
//! the graph either before or after a mutation and never in between.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::AclResult;
use crate::grants::ResPermsPair;
use crate::graph::AuthorizationGraph;
use crate::ids::{PermissionId, ResourceId, RoleId};

/// Cloneable, shareable handle to an [`AuthorizationGraph`].
///
/// # Example
///
/// ```
/// use acl_graph::ids::{ResourceTypeId, RoleId};
/// use acl_graph::resources::ResourceType;
/// use acl_graph::roles::Role;
/// use acl_graph::SharedGraph;
///
/// let shared = SharedGraph::default();
/// shared.update(|g| g.register_role(Role::new(RoleId(1), "viewer"))).unwrap();
///
/// // Multi-step changes are all-or-nothing
/// let result = shared.transaction(|g| {
///     g.add_resource_type(ResourceType::new(ResourceTypeId(1), "document"))?;
///     g.register_role(Role::new(RoleId(1), "duplicate"))
/// });
/// assert!(result.is_err());
/// assert!(shared.read().resource_type(ResourceTypeId(1)).is_none());
/// ```
#[derive(Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<AuthorizationGraph>>,
}

impl std::fmt::Debug for SharedGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedGraph")
            .field("stats", &self.inner.read().stats())
            .finish()
    }
}

impl SharedGraph {
    /// Wrap a fully built graph.
    pub fn new(graph: AuthorizationGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Acquire a read guard for several queries against one snapshot.
    pub fn read(&self) -> RwLockReadGuard<'_, AuthorizationGraph> {
        self.inner.read()
    }

    /// Acquire the write guard.
    pub fn write(&self) -> RwLockWriteGuard<'_, AuthorizationGraph> {
        self.inner.write()
    }

    /// Run a single mutation under the write lock.
    ///
    /// Every [`AuthorizationGraph`] mutation is atomic on its own; use
    /// [`SharedGraph::transaction`] to group several.
    pub fn update<T, F>(&self, f: F) -> AclResult<T>
    where
        F: FnOnce(&mut AuthorizationGraph) -> AclResult<T>,
    {
        f(&mut self.inner.write())
    }

    /// Run several mutations as one unit.
    ///
    /// The closure works on a copy of the graph; the copy replaces the live
    /// graph only if the closure returns `Ok`.
    pub fn transaction<T, F>(&self, f: F) -> AclResult<T>
    where
        F: FnOnce(&mut AuthorizationGraph) -> AclResult<T>,
    {
        let mut guard = self.inner.write();
        let mut draft = guard.clone();
        match f(&mut draft) {
            Ok(value) => {
                *guard = draft;
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rolled back graph transaction");
                Err(e)
            }
        }
    }

    /// Swap in a new graph, returning the previous one.
    pub fn replace(&self, graph: AuthorizationGraph) -> AuthorizationGraph {
        std::mem::replace(&mut *self.inner.write(), graph)
    }

    /// Copy of the current graph.
    pub fn snapshot(&self) -> AuthorizationGraph {
        self.inner.read().clone()
    }

    /// See [`AuthorizationGraph::has_permission`].
    pub fn has_permission(
        &self,
        role: RoleId,
        resource: ResourceId,
        permission: PermissionId,
    ) -> AclResult<bool> {
        self.inner.read().has_permission(role, resource, permission)
    }

    /// See [`AuthorizationGraph::has_permission_named`].
    pub fn has_permission_named(
        &self,
        role: RoleId,
        resource: ResourceId,
        permission: &str,
    ) -> AclResult<bool> {
        self.inner
            .read()
            .has_permission_named(role, resource, permission)
    }

    /// See [`AuthorizationGraph::effective_resources`].
    pub fn effective_resources(&self, role: RoleId) -> AclResult<BTreeMap<ResourceId, ResPermsPair>> {
        self.inner.read().effective_resources(role)
    }
}

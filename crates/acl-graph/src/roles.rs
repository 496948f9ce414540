//! # Roles
//!
//! Roles are the nodes of the inheritance DAG. A role owns its direct grants
//! and the ids of its direct parents; everything a role can do beyond its
//! direct grants comes from walking those parent ids.
//!
//! ## Traversal
//!
//! ```text
//!            Root
//!           /    \
//!      Viewer    Auditor        Editor.ancestors() = Editor, Viewer, Root
//!         |                     (Root visited once, even when reachable
//!      Editor                    through several parents)
//! ```
//!
//! Every traversal keeps its own visited set, so concurrent readers never
//! share scratch state and shared ancestors are visited exactly once.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::Deref;

use crate::grants::ResPermsPair;
use crate::graph::AuthorizationGraph;
use crate::ids::{PermissionId, ResourceId, RoleId};
use crate::permissions::PermissionSet;

/// A node in the role inheritance graph.
///
/// Roles are created bare with [`Role::new`] and then wired up through the
/// [`AuthorizationGraph`] mutation API, which enforces acyclicity and
/// permission containment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Role {
    /// Unique role id.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Whether principals can log in as this role directly.
    pub is_login: bool,
    parents: BTreeSet<RoleId>,
    resources: BTreeMap<ResourceId, ResPermsPair>,
}

impl Role {
    /// Create a role with no parents and no grants.
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_login: false,
            parents: BTreeSet::new(),
            resources: BTreeMap::new(),
        }
    }

    /// Mark the role as a login role.
    pub fn with_login(mut self, is_login: bool) -> Self {
        self.is_login = is_login;
        self
    }

    /// Direct parents.
    pub fn parents(&self) -> &BTreeSet<RoleId> {
        &self.parents
    }

    /// Check if `id` is a direct parent.
    pub fn has_parent(&self, id: RoleId) -> bool {
        self.parents.contains(&id)
    }

    /// Direct grants, keyed by resource id.
    pub fn resources(&self) -> &BTreeMap<ResourceId, ResPermsPair> {
        &self.resources
    }

    /// The direct grant on a resource, if any.
    pub fn grant(&self, resource: ResourceId) -> Option<&ResPermsPair> {
        self.resources.get(&resource)
    }

    pub(crate) fn insert_parent(&mut self, parent: RoleId) -> bool {
        self.parents.insert(parent)
    }

    pub(crate) fn remove_parent(&mut self, parent: RoleId) -> bool {
        self.parents.remove(&parent)
    }

    /// Replace the direct grant for the pair's resource.
    pub(crate) fn set_grant(&mut self, pair: ResPermsPair) -> Option<ResPermsPair> {
        self.resources.insert(pair.resource(), pair)
    }

    pub(crate) fn remove_grant(&mut self, resource: ResourceId) -> Option<ResPermsPair> {
        self.resources.remove(&resource)
    }

    /// Drop every direct grant for which `keep` is false.
    ///
    /// # Returns
    ///
    /// The number of grants dropped
    pub(crate) fn retain_grants<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&ResPermsPair) -> bool,
    {
        let before = self.resources.len();
        self.resources.retain(|_, pair| keep(pair));
        before - self.resources.len()
    }

    pub(crate) fn grants_mut(&mut self) -> impl Iterator<Item = &mut ResPermsPair> {
        self.resources.values_mut()
    }
}

/// Depth-first walk over a role and all of its ancestors.
///
/// Yields the starting role first. Each reachable role is yielded exactly
/// once, so a graph with N roles and M parent edges is walked in O(N + M).
/// Parent ids with no registered role are skipped.
pub struct Ancestors<'g> {
    roles: &'g BTreeMap<RoleId, Role>,
    stack: Vec<RoleId>,
    visited: HashSet<RoleId>,
}

impl<'g> Ancestors<'g> {
    pub(crate) fn new(roles: &'g BTreeMap<RoleId, Role>, start: RoleId) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start);
        Self {
            roles,
            stack: vec![start],
            visited,
        }
    }
}

impl<'g> Iterator for Ancestors<'g> {
    type Item = &'g Role;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let Some(role) = self.roles.get(&id) else {
                continue;
            };
            // reversed so that lower parent ids are popped first
            for parent in role.parents.iter().rev() {
                if self.visited.insert(*parent) {
                    self.stack.push(*parent);
                }
            }
            return Some(role);
        }
        None
    }
}

/// A registered role together with the graph it lives in.
///
/// Obtained from [`AuthorizationGraph::role`]. All queries here are read-only
/// and can run concurrently with other readers.
///
/// # Example
///
/// ```
/// use acl_graph::ids::{PermissionId, ResourceId, ResourceTypeId, RoleId};
/// use acl_graph::permissions::Permission;
/// use acl_graph::resources::{Resource, ResourceType};
/// use acl_graph::roles::Role;
/// use acl_graph::AuthorizationGraph;
///
/// let mut graph = AuthorizationGraph::new();
/// graph.add_resource_type(ResourceType::new(ResourceTypeId(1), "document")).unwrap();
/// graph.add_permission(Permission::new(PermissionId(1), "read", ResourceTypeId(1))).unwrap();
/// graph.register_resource(Resource::new(ResourceId(1), "doc1", ResourceTypeId(1))).unwrap();
///
/// graph.register_role(Role::new(RoleId(1), "viewer")).unwrap();
/// graph.register_role(Role::new(RoleId(2), "editor")).unwrap();
/// graph.add_parent(RoleId(2), RoleId(1)).unwrap();
/// graph.grant(RoleId(1), ResourceId(1), [PermissionId(1)]).unwrap();
///
/// let editor = graph.role(RoleId(2)).unwrap();
/// assert_eq!(editor.ancestor_closure(), vec![RoleId(2), RoleId(1)]);
/// assert!(editor.has_permission(ResourceId(1), PermissionId(1)));
/// ```
#[derive(Clone, Copy)]
pub struct RoleRef<'g> {
    graph: &'g AuthorizationGraph,
    role: &'g Role,
}

impl<'g> RoleRef<'g> {
    pub(crate) fn new(graph: &'g AuthorizationGraph, role: &'g Role) -> Self {
        Self { graph, role }
    }

    /// The underlying role.
    pub fn role(&self) -> &'g Role {
        self.role
    }

    /// Walk this role and every ancestor, each exactly once.
    pub fn ancestors(&self) -> Ancestors<'g> {
        self.graph.ancestors(self.role.id)
    }

    /// Ids of this role and all its ancestors, deduplicated, self first.
    pub fn ancestor_closure(&self) -> Vec<RoleId> {
        self.ancestors().map(|r| r.id).collect()
    }

    /// Check if `other` is this role or one of its ancestors.
    pub fn inherits_from(&self, other: RoleId) -> bool {
        self.ancestors().any(|r| r.id == other)
    }

    /// Merge the direct grants of every role in the ancestor closure.
    ///
    /// When several roles grant the same resource the result holds the union
    /// of their permission ids. Group grants are reported on the group's id;
    /// they are not expanded to members here.
    pub fn effective_resources(&self) -> BTreeMap<ResourceId, ResPermsPair> {
        let mut merged: BTreeMap<ResourceId, ResPermsPair> = BTreeMap::new();
        for role in self.ancestors() {
            for (resource, pair) in &role.resources {
                merged
                    .entry(*resource)
                    .and_modify(|existing| existing.merge(pair))
                    .or_insert_with(|| pair.clone());
            }
        }
        merged
    }

    /// Union of every permission the closure holds on `resource`, directly or
    /// through any group that contains it.
    pub fn effective_permissions(&self, resource: ResourceId) -> PermissionSet {
        let targets = self.graph.grant_targets(resource);
        let mut permissions = PermissionSet::new();
        for role in self.ancestors() {
            for target in &targets {
                if let Some(pair) = role.resources.get(target) {
                    permissions.merge(pair.permissions());
                }
            }
        }
        permissions
    }

    /// Check if the role may exercise `permission` on `resource`.
    ///
    /// True when any role in the ancestor closure grants the permission on
    /// the resource itself or on a group that contains it, directly or
    /// through nested groups. Unknown resources simply yield `false`.
    pub fn has_permission(&self, resource: ResourceId, permission: PermissionId) -> bool {
        let targets = self.graph.grant_targets(resource);
        self.ancestors().any(|role| {
            targets.iter().any(|target| {
                role.resources
                    .get(target)
                    .is_some_and(|pair| pair.has(permission))
            })
        })
    }

    /// Like [`RoleRef::has_permission`], resolving the permission by name
    /// through the resource's type. Unknown names yield `false`.
    pub fn has_permission_named(&self, resource: ResourceId, permission: &str) -> bool {
        match self.graph.permission_id_for(resource, permission) {
            Some(id) => self.has_permission(resource, id),
            None => false,
        }
    }
}

impl<'g> Deref for RoleRef<'g> {
    type Target = Role;

    fn deref(&self) -> &Self::Target {
        self.role
    }
}

impl std::fmt::Debug for RoleRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleRef")
            .field("id", &self.role.id)
            .field("name", &self.role.name)
            .finish()
    }
}

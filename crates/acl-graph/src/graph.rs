//! # Authorization graph
//!
//! The registry owning every role, resource, resource type and permission,
//! and the mutation surface that keeps them consistent.
//!
//! Each mutating method validates everything it needs before touching any
//! state, so an `Err` return always means the graph is unchanged.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::{AclError, AclResult};
use crate::grants::ResPermsPair;
use crate::ids::{PermissionId, ResourceId, ResourceTypeId, RoleId};
use crate::permissions::{Permission, PermissionCatalog};
use crate::resources::{Resource, ResourceType};
use crate::roles::{Ancestors, Role, RoleRef};

/// Entity counts for a graph snapshot.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct GraphStats {
    /// Registered roles
    pub roles: usize,
    /// Child -> parent edges
    pub parent_edges: usize,
    /// Registered resources, groups included
    pub resources: usize,
    /// Registered resource groups
    pub groups: usize,
    /// Registered resource types
    pub resource_types: usize,
    /// Catalog permissions
    pub permissions: usize,
    /// Direct (role, resource) grants
    pub grants: usize,
}

/// The in-memory authorization graph (role manager).
///
/// Parent links and group memberships are stored as id adjacency, never as
/// references between entities. Queries take `&self` and allocate their own
/// traversal state; mutations take `&mut self`. Wrap the graph in a
/// [`SharedGraph`](crate::shared::SharedGraph) to share it between threads.
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
/// let doc_type = ResourceTypeId(1);
/// graph.add_resource_type(ResourceType::new(doc_type, "document")).unwrap();
/// graph.add_permission(Permission::new(PermissionId(1), "read", doc_type)).unwrap();
/// graph.add_permission(Permission::new(PermissionId(2), "write", doc_type)).unwrap();
/// graph.register_resource(Resource::new(ResourceId(1), "Doc1", doc_type)).unwrap();
///
/// graph.register_role(Role::new(RoleId(1), "Viewer")).unwrap();
/// graph.register_role(Role::new(RoleId(2), "Editor")).unwrap();
/// graph.add_parent(RoleId(2), RoleId(1)).unwrap();
/// graph.grant(RoleId(1), ResourceId(1), [PermissionId(1)]).unwrap();
/// graph.grant(RoleId(2), ResourceId(1), [PermissionId(2)]).unwrap();
///
/// assert!(graph.has_permission(RoleId(2), ResourceId(1), PermissionId(1)).unwrap());
/// assert!(graph.has_permission(RoleId(2), ResourceId(1), PermissionId(2)).unwrap());
/// assert!(!graph.has_permission(RoleId(1), ResourceId(1), PermissionId(2)).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuthorizationGraph {
    catalog: PermissionCatalog,
    resource_types: BTreeMap<ResourceTypeId, ResourceType>,
    resources: BTreeMap<ResourceId, Resource>,
    /// member -> groups that directly contain it
    member_of: HashMap<ResourceId, BTreeSet<ResourceId>>,
    roles: BTreeMap<RoleId, Role>,
}

impl AuthorizationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Resource types and permissions
    // =========================================================================

    /// Register a resource type.
    ///
    /// Any permissions already present in the type's vocabulary are added to
    /// the catalog as well.
    ///
    /// # Errors
    ///
    /// `DuplicateRegistration` if the type id, or any of its permission ids,
    /// is already registered.
    pub fn add_resource_type(&mut self, resource_type: ResourceType) -> AclResult<()> {
        if self.resource_types.contains_key(&resource_type.id) {
            return Err(AclError::DuplicateRegistration {
                kind: "resource_type",
                id: resource_type.id.get(),
            });
        }
        if let Some(id) = resource_type
            .permissions()
            .ids()
            .find(|id| self.catalog.contains(*id))
        {
            return Err(AclError::DuplicateRegistration {
                kind: "permission",
                id: id.get(),
            });
        }

        for (id, name) in resource_type.permissions().iter() {
            self.catalog
                .insert(Permission::new(id, name, resource_type.id))?;
        }
        tracing::debug!(resource_type = %resource_type.id, name = %resource_type.name, "Registered resource type");
        self.resource_types.insert(resource_type.id, resource_type);
        Ok(())
    }

    /// Remove a resource type.
    ///
    /// Cascades: every resource of the type is removed, every grant on those
    /// resources is stripped from every role, and the type's permissions
    /// leave the catalog.
    ///
    /// # Errors
    ///
    /// `UnknownResourceType` if the type is not registered.
    pub fn remove_resource_type(&mut self, id: ResourceTypeId) -> AclResult<ResourceType> {
        let resource_type = self
            .resource_types
            .remove(&id)
            .ok_or(AclError::UnknownResourceType(id))?;

        let doomed: Vec<ResourceId> = self
            .resources
            .values()
            .filter(|r| r.resource_type == id)
            .map(|r| r.id)
            .collect();

        // by the grant's own type: grants on already-removed resources go too
        let mut stripped = 0usize;
        for role in self.roles.values_mut() {
            stripped += role.retain_grants(|pair| pair.resource_type() != id);
        }
        for resource in &doomed {
            self.unlink_resource(*resource);
        }
        let permissions = self.catalog.remove_type(id);

        tracing::info!(
            resource_type = %id,
            resources = doomed.len(),
            grants = stripped,
            permissions = permissions.len(),
            "Removed resource type with cascade"
        );
        Ok(resource_type)
    }

    /// Look up a resource type.
    pub fn resource_type(&self, id: ResourceTypeId) -> Option<&ResourceType> {
        self.resource_types.get(&id)
    }

    /// Iterate over all resource types in id order.
    pub fn resource_types(&self) -> impl Iterator<Item = &ResourceType> {
        self.resource_types.values()
    }

    /// Add a permission to the catalog and to its resource type's vocabulary.
    ///
    /// # Errors
    ///
    /// * `UnknownResourceType` if the permission's type is not registered
    /// * `DuplicateRegistration` if the permission id is already in use
    pub fn add_permission(&mut self, permission: Permission) -> AclResult<()> {
        let resource_type = self
            .resource_types
            .get_mut(&permission.resource_type)
            .ok_or(AclError::UnknownResourceType(permission.resource_type))?;
        if self.catalog.contains(permission.id) {
            return Err(AclError::DuplicateRegistration {
                kind: "permission",
                id: permission.id.get(),
            });
        }

        resource_type.insert_permission(&permission);
        tracing::debug!(permission = %permission.id, name = %permission.name, resource_type = %permission.resource_type, "Added permission");
        self.catalog.insert(permission)
    }

    /// Remove a permission from a resource type's vocabulary.
    ///
    /// The id is stripped from every existing grant on resources of that
    /// type at the same time, so no grant is left holding it.
    ///
    /// # Returns
    ///
    /// `true` if the permission was part of the vocabulary
    ///
    /// # Errors
    ///
    /// `UnknownResourceType` if the type is not registered.
    pub fn remove_permission(
        &mut self,
        resource_type: ResourceTypeId,
        permission: PermissionId,
    ) -> AclResult<bool> {
        let rt = self
            .resource_types
            .get_mut(&resource_type)
            .ok_or(AclError::UnknownResourceType(resource_type))?;
        if !rt.remove_permission(permission) {
            return Ok(false);
        }
        self.catalog.remove(permission);

        let mut stripped = 0usize;
        for role in self.roles.values_mut() {
            for pair in role.grants_mut() {
                if pair.resource_type() == resource_type && pair.strip(permission) {
                    stripped += 1;
                }
            }
        }
        tracing::debug!(%resource_type, %permission, grants = stripped, "Removed permission");
        Ok(true)
    }

    /// The permission catalog.
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Look up a catalog permission.
    pub fn permission(&self, id: PermissionId) -> Option<&Permission> {
        self.catalog.get(id)
    }

    /// Resolve a permission name through a resource's type.
    pub fn permission_id_for(&self, resource: ResourceId, name: &str) -> Option<PermissionId> {
        let resource = self.resources.get(&resource)?;
        self.catalog
            .find_by_name(resource.resource_type, name)
            .map(|p| p.id)
    }

    // =========================================================================
    // Resources and groups
    // =========================================================================

    /// Register a resource or resource group.
    ///
    /// A group may arrive with members already attached; each must be a
    /// registered resource of the group's type. Grants still held on the id
    /// from an earlier removed resource apply again if the type matches and
    /// are dropped otherwise.
    ///
    /// # Errors
    ///
    /// * `DuplicateRegistration` if the id is taken
    /// * `UnknownResourceType` if the resource's type is not registered
    /// * `UnknownResource` / `TypeMismatch` for an invalid pre-attached member
    pub fn register_resource(&mut self, resource: Resource) -> AclResult<()> {
        if self.resources.contains_key(&resource.id) {
            return Err(AclError::DuplicateRegistration {
                kind: "resource",
                id: resource.id.get(),
            });
        }
        if !self.resource_types.contains_key(&resource.resource_type) {
            return Err(AclError::UnknownResourceType(resource.resource_type));
        }
        let members: Vec<ResourceId> = resource
            .members()
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default();
        for member in &members {
            let existing = self
                .resources
                .get(member)
                .ok_or(AclError::UnknownResource(*member))?;
            resource.check_member(existing)?;
        }

        for member in members {
            self.member_of.entry(member).or_default().insert(resource.id);
        }
        let dropped = self.drop_foreign_grants(resource.id, resource.resource_type);
        if dropped > 0 {
            tracing::info!(resource = %resource.id, grants = dropped, "Dropped leftover grants of another resource type");
        }
        tracing::debug!(resource = %resource.id, name = %resource.name, group = resource.is_group(), "Registered resource");
        self.resources.insert(resource.id, resource);
        Ok(())
    }

    /// Register several resources.
    ///
    /// Each item is applied or rejected on its own; a failing item leaves no
    /// trace and does not stop the remaining items.
    ///
    /// # Returns
    ///
    /// One `(id, outcome)` entry per input, in input order
    pub fn register_resources<I>(&mut self, resources: I) -> Vec<(ResourceId, AclResult<()>)>
    where
        I: IntoIterator<Item = Resource>,
    {
        resources
            .into_iter()
            .map(|resource| {
                let id = resource.id;
                let outcome = self.register_resource(resource);
                if let Err(ref e) = outcome {
                    tracing::warn!(resource = %id, error = %e, "Skipped resource in batch registration");
                }
                (id, outcome)
            })
            .collect()
    }

    /// Remove a resource from the registry.
    ///
    /// The resource leaves every group it belonged to, and if it is a group
    /// its members stop being contained by it. Role grants are a role-owned
    /// relation and are left as they are; use
    /// [`AuthorizationGraph::purge_resource`] to drop them too.
    ///
    /// # Errors
    ///
    /// `UnknownResource` if the id is not registered.
    pub fn remove_resource(&mut self, id: ResourceId) -> AclResult<Resource> {
        let resource = self
            .unlink_resource(id)
            .ok_or(AclError::UnknownResource(id))?;
        tracing::debug!(resource = %id, "Removed resource");
        Ok(resource)
    }

    /// Remove a resource and strip every role's grant on it.
    ///
    /// # Errors
    ///
    /// `UnknownResource` if the id is not registered.
    pub fn purge_resource(&mut self, id: ResourceId) -> AclResult<Resource> {
        let resource = self
            .unlink_resource(id)
            .ok_or(AclError::UnknownResource(id))?;
        for role in self.roles.values_mut() {
            role.remove_grant(id);
        }
        tracing::debug!(resource = %id, "Purged resource and its grants");
        Ok(resource)
    }

    /// Look up a resource.
    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(&id)
    }

    /// Find a resource by name (linear scan; the lowest id wins on ties).
    pub fn resource_by_name(&self, name: &str) -> Option<&Resource> {
        self.resources.values().find(|r| r.name == name)
    }

    /// Iterate over all resources in id order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Add `member` to `group`.
    ///
    /// # Returns
    ///
    /// `true` if the membership is new
    ///
    /// # Errors
    ///
    /// * `UnknownResource` if either id is not registered
    /// * `TypeMismatch` if `group` is not a group or the types differ
    pub fn add_member(&mut self, group: ResourceId, member: ResourceId) -> AclResult<bool> {
        self.check_membership(group, member)?;
        let added = self
            .resources
            .get_mut(&group)
            .is_some_and(|g| g.attach_member(member));
        if added {
            self.member_of.entry(member).or_default().insert(group);
            tracing::debug!(%group, %member, "Added group member");
        }
        Ok(added)
    }

    /// Remove `member` from `group`.
    ///
    /// # Returns
    ///
    /// `true` if the member was present
    ///
    /// # Errors
    ///
    /// Same conditions as [`AuthorizationGraph::add_member`].
    pub fn remove_member(&mut self, group: ResourceId, member: ResourceId) -> AclResult<bool> {
        self.check_membership(group, member)?;
        let removed = self
            .resources
            .get_mut(&group)
            .is_some_and(|g| g.detach_member(member));
        if removed {
            self.unindex_membership(group, member);
            tracing::debug!(%group, %member, "Removed group member");
        }
        Ok(removed)
    }

    /// Every group that contains `resource`, directly or through nested
    /// groups. The resource itself is not included.
    pub fn containing_groups(&self, resource: ResourceId) -> BTreeSet<ResourceId> {
        let mut found = BTreeSet::new();
        let mut stack = vec![resource];
        while let Some(current) = stack.pop() {
            if let Some(groups) = self.member_of.get(&current) {
                for group in groups {
                    if *group != resource && found.insert(*group) {
                        stack.push(*group);
                    }
                }
            }
        }
        found
    }

    /// Every resource contained in `group`, directly or through nested
    /// groups. Empty for plain or unknown resources.
    pub fn expand_group(&self, group: ResourceId) -> BTreeSet<ResourceId> {
        let mut found = BTreeSet::new();
        let mut stack = vec![group];
        while let Some(current) = stack.pop() {
            let Some(members) = self.resources.get(&current).and_then(Resource::members) else {
                continue;
            };
            for member in members {
                if *member != group && found.insert(*member) {
                    stack.push(*member);
                }
            }
        }
        found
    }

    /// The resource itself plus every group containing it: the ids a grant
    /// can sit on and still reach `resource`.
    pub(crate) fn grant_targets(&self, resource: ResourceId) -> Vec<ResourceId> {
        let mut targets = vec![resource];
        targets.extend(self.containing_groups(resource));
        targets
    }

    fn check_membership(&self, group: ResourceId, member: ResourceId) -> AclResult<()> {
        let g = self
            .resources
            .get(&group)
            .ok_or(AclError::UnknownResource(group))?;
        let m = self
            .resources
            .get(&member)
            .ok_or(AclError::UnknownResource(member))?;
        g.check_member(m)
    }

    fn unindex_membership(&mut self, group: ResourceId, member: ResourceId) {
        if let Some(groups) = self.member_of.get_mut(&member) {
            groups.remove(&group);
            if groups.is_empty() {
                self.member_of.remove(&member);
            }
        }
    }

    /// Drop grants on `id` left over from an earlier resource of another type.
    fn drop_foreign_grants(&mut self, id: ResourceId, resource_type: ResourceTypeId) -> usize {
        self.roles
            .values_mut()
            .map(|role| role.retain_grants(|pair| pair.resource() != id || pair.resource_type() == resource_type))
            .sum()
    }

    /// Drop a resource and every membership edge touching it.
    fn unlink_resource(&mut self, id: ResourceId) -> Option<Resource> {
        let resource = self.resources.remove(&id)?;

        if let Some(groups) = self.member_of.remove(&id) {
            for group in groups {
                if let Some(g) = self.resources.get_mut(&group) {
                    g.detach_member(id);
                }
            }
        }
        if let Some(members) = resource.members() {
            for member in members {
                self.unindex_membership(id, *member);
            }
        }
        Some(resource)
    }

    // =========================================================================
    // Roles and hierarchy
    // =========================================================================

    /// Register a bare role.
    ///
    /// # Errors
    ///
    /// `DuplicateRegistration` if the id is taken.
    pub fn register_role(&mut self, role: Role) -> AclResult<()> {
        if self.roles.contains_key(&role.id) {
            return Err(AclError::DuplicateRegistration {
                kind: "role",
                id: role.id.get(),
            });
        }
        tracing::debug!(role = %role.id, name = %role.name, "Registered role");
        self.roles.insert(role.id, role);
        Ok(())
    }

    /// Remove a role, detaching it from the parents of every other role.
    ///
    /// # Errors
    ///
    /// `UnknownRole` if the role is not registered.
    pub fn remove_role(&mut self, id: RoleId) -> AclResult<Role> {
        let role = self.roles.remove(&id).ok_or(AclError::UnknownRole(id))?;
        let mut detached = 0usize;
        for other in self.roles.values_mut() {
            if other.remove_parent(id) {
                detached += 1;
            }
        }
        tracing::debug!(role = %id, children = detached, "Removed role");
        Ok(role)
    }

    /// Look up a role.
    pub fn role(&self, id: RoleId) -> Option<RoleRef<'_>> {
        self.roles.get(&id).map(|role| RoleRef::new(self, role))
    }

    /// Find a role by name (the lowest id wins on ties).
    pub fn role_by_name(&self, name: &str) -> Option<RoleRef<'_>> {
        self.roles
            .values()
            .find(|r| r.name == name)
            .map(|role| RoleRef::new(self, role))
    }

    /// Iterate over all roles in id order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Walk a role and all its ancestors. Empty for an unknown role.
    pub fn ancestors(&self, id: RoleId) -> Ancestors<'_> {
        Ancestors::new(&self.roles, id)
    }

    /// Make `child` inherit from `parent`.
    ///
    /// # Returns
    ///
    /// `true` if the edge is new, `false` if it already existed
    ///
    /// # Errors
    ///
    /// * `UnknownRole` if either role is not registered
    /// * `CyclicInheritance` if `child` is `parent` or one of its ancestors;
    ///   no edge is added
    pub fn add_parent(&mut self, child: RoleId, parent: RoleId) -> AclResult<bool> {
        if !self.roles.contains_key(&child) {
            return Err(AclError::UnknownRole(child));
        }
        if !self.roles.contains_key(&parent) {
            return Err(AclError::UnknownRole(parent));
        }
        if self.ancestors(parent).any(|r| r.id == child) {
            tracing::warn!(role = %child, %parent, "Rejected parent edge that would create a cycle");
            return Err(AclError::CyclicInheritance {
                role: child,
                parent,
            });
        }

        let added = self
            .roles
            .get_mut(&child)
            .is_some_and(|role| role.insert_parent(parent));
        if added {
            tracing::debug!(role = %child, %parent, "Added parent edge");
        }
        Ok(added)
    }

    /// Add several parents to `child`, each edge on its own.
    ///
    /// # Returns
    ///
    /// One `(parent, outcome)` entry per requested parent, in input order
    pub fn add_parents<I>(&mut self, child: RoleId, parents: I) -> Vec<(RoleId, AclResult<bool>)>
    where
        I: IntoIterator<Item = RoleId>,
    {
        parents
            .into_iter()
            .map(|parent| (parent, self.add_parent(child, parent)))
            .collect()
    }

    /// Remove the `child -> parent` edge.
    ///
    /// # Returns
    ///
    /// `true` if an edge was removed; `false` if `parent` was not a parent
    ///
    /// # Errors
    ///
    /// `UnknownRole` if `child` is not registered.
    pub fn remove_parent(&mut self, child: RoleId, parent: RoleId) -> AclResult<bool> {
        let role = self
            .roles
            .get_mut(&child)
            .ok_or(AclError::UnknownRole(child))?;
        let removed = role.remove_parent(parent);
        if removed {
            tracing::debug!(role = %child, %parent, "Removed parent edge");
        }
        Ok(removed)
    }

    /// Direct parents of a role.
    ///
    /// # Errors
    ///
    /// `UnknownRole` if the role is not registered.
    pub fn parents_of(&self, id: RoleId) -> AclResult<Vec<RoleId>> {
        let role = self.roles.get(&id).ok_or(AclError::UnknownRole(id))?;
        Ok(role.parents().iter().copied().collect())
    }

    /// Every role that inherits from `id`, directly or transitively.
    ///
    /// # Errors
    ///
    /// `UnknownRole` if the role is not registered.
    pub fn descendants_of(&self, id: RoleId) -> AclResult<BTreeSet<RoleId>> {
        if !self.roles.contains_key(&id) {
            return Err(AclError::UnknownRole(id));
        }
        let mut children: HashMap<RoleId, Vec<RoleId>> = HashMap::new();
        for role in self.roles.values() {
            for parent in role.parents() {
                children.entry(*parent).or_default().push(role.id);
            }
        }

        let mut found = BTreeSet::new();
        let mut visited = HashSet::from([id]);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for child in children.get(&current).into_iter().flatten() {
                if visited.insert(*child) {
                    found.insert(*child);
                    stack.push(*child);
                }
            }
        }
        Ok(found)
    }

    // =========================================================================
    // Grants
    // =========================================================================

    /// Set `role`'s direct grant on `resource` to exactly `permissions`.
    ///
    /// An existing direct grant on the same resource is replaced, not
    /// extended.
    ///
    /// # Errors
    ///
    /// * `UnknownRole` / `UnknownResource` for unregistered ids
    /// * `UnknownPermission` if any id is outside the resource type's
    ///   vocabulary; the previous grant, if any, stays in place
    pub fn grant<I>(&mut self, role: RoleId, resource: ResourceId, permissions: I) -> AclResult<()>
    where
        I: IntoIterator<Item = PermissionId>,
    {
        let pair = self.build_pair(role, resource, |res, rt| {
            ResPermsPair::new(res, rt, permissions)
        })?;
        self.store_grant(role, pair);
        Ok(())
    }

    /// Grant `role` every permission of `resource`'s type.
    ///
    /// # Errors
    ///
    /// `UnknownRole` / `UnknownResource` for unregistered ids.
    pub fn grant_all(&mut self, role: RoleId, resource: ResourceId) -> AclResult<()> {
        let pair = self.build_pair(role, resource, ResPermsPair::full)?;
        self.store_grant(role, pair);
        Ok(())
    }

    /// Remove `role`'s direct grant on `resource`.
    ///
    /// # Returns
    ///
    /// `true` if a grant was removed
    ///
    /// # Errors
    ///
    /// `UnknownRole` if the role is not registered.
    pub fn revoke(&mut self, role: RoleId, resource: ResourceId) -> AclResult<bool> {
        let r = self.roles.get_mut(&role).ok_or(AclError::UnknownRole(role))?;
        let removed = r.remove_grant(resource).is_some();
        if removed {
            tracing::debug!(%role, %resource, "Revoked grant");
        }
        Ok(removed)
    }

    fn build_pair<F>(&self, role: RoleId, resource: ResourceId, build: F) -> AclResult<ResPermsPair>
    where
        F: FnOnce(&Resource, &ResourceType) -> AclResult<ResPermsPair>,
    {
        if !self.roles.contains_key(&role) {
            return Err(AclError::UnknownRole(role));
        }
        let res = self
            .resources
            .get(&resource)
            .ok_or(AclError::UnknownResource(resource))?;
        let rt = self
            .resource_types
            .get(&res.resource_type)
            .ok_or(AclError::UnknownResourceType(res.resource_type))?;
        build(res, rt)
    }

    fn store_grant(&mut self, role: RoleId, pair: ResPermsPair) {
        let resource = pair.resource();
        let count = pair.permissions().len();
        if let Some(r) = self.roles.get_mut(&role) {
            let replaced = r.set_grant(pair).is_some();
            tracing::debug!(%role, %resource, permissions = count, replaced, "Stored grant");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Check if `role` may exercise `permission` on `resource`.
    ///
    /// Unknown resources and permissions yield `false`.
    ///
    /// # Errors
    ///
    /// `UnknownRole` if the role is not registered.
    pub fn has_permission(
        &self,
        role: RoleId,
        resource: ResourceId,
        permission: PermissionId,
    ) -> AclResult<bool> {
        let r = self.role(role).ok_or(AclError::UnknownRole(role))?;
        Ok(r.has_permission(resource, permission))
    }

    /// Check a permission by name, resolved through the resource's type.
    ///
    /// # Errors
    ///
    /// `UnknownRole` if the role is not registered.
    pub fn has_permission_named(
        &self,
        role: RoleId,
        resource: ResourceId,
        permission: &str,
    ) -> AclResult<bool> {
        let r = self.role(role).ok_or(AclError::UnknownRole(role))?;
        Ok(r.has_permission_named(resource, permission))
    }

    /// Union of the direct grants across `role`'s ancestor closure.
    ///
    /// # Errors
    ///
    /// `UnknownRole` if the role is not registered.
    pub fn effective_resources(&self, role: RoleId) -> AclResult<BTreeMap<ResourceId, ResPermsPair>> {
        let r = self.role(role).ok_or(AclError::UnknownRole(role))?;
        Ok(r.effective_resources())
    }

    /// Roles holding a direct grant on `resource`.
    pub fn roles_granting(&self, resource: ResourceId) -> Vec<RoleId> {
        self.roles
            .values()
            .filter(|r| r.grant(resource).is_some())
            .map(|r| r.id)
            .collect()
    }

    /// Every role for which `has_permission(role, resource, permission)`
    /// holds.
    pub fn effective_roles_for(&self, resource: ResourceId, permission: PermissionId) -> Vec<RoleId> {
        self.roles
            .values()
            .map(|role| RoleRef::new(self, role))
            .filter(|r| r.has_permission(resource, permission))
            .map(|r| r.id)
            .collect()
    }

    /// Entity counts.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            roles: self.roles.len(),
            parent_edges: self.roles.values().map(|r| r.parents().len()).sum(),
            resources: self.resources.len(),
            groups: self.resources.values().filter(|r| r.is_group()).count(),
            resource_types: self.resource_types.len(),
            permissions: self.catalog.len(),
            grants: self.roles.values().map(|r| r.resources().len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: ResourceTypeId = ResourceTypeId(1);
    const HOST: ResourceTypeId = ResourceTypeId(2);
    const READ: PermissionId = PermissionId(1);
    const WRITE: PermissionId = PermissionId(2);
    const EDIT: PermissionId = PermissionId(3);
    const SSH: PermissionId = PermissionId(10);

    fn base_graph() -> AuthorizationGraph {
        let mut graph = AuthorizationGraph::new();
        graph
            .add_resource_type(ResourceType::new(DOC, "document"))
            .unwrap();
        graph
            .add_resource_type(ResourceType::new(HOST, "host"))
            .unwrap();
        for (id, name) in [(READ, "read"), (WRITE, "write"), (EDIT, "edit")] {
            graph.add_permission(Permission::new(id, name, DOC)).unwrap();
        }
        graph
            .add_permission(Permission::new(SSH, "ssh", HOST))
            .unwrap();
        graph
    }

    fn add_roles(graph: &mut AuthorizationGraph, ids: &[i64]) {
        for id in ids {
            graph
                .register_role(Role::new(RoleId(*id), format!("role-{id}")))
                .unwrap();
        }
    }

    fn add_doc(graph: &mut AuthorizationGraph, id: i64) {
        graph
            .register_resource(Resource::new(ResourceId(id), format!("doc-{id}"), DOC))
            .unwrap();
    }

    #[test]
    fn test_viewer_editor_scenario() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        graph.register_role(Role::new(RoleId(1), "Viewer")).unwrap();
        graph.register_role(Role::new(RoleId(2), "Editor")).unwrap();
        graph.add_parent(RoleId(2), RoleId(1)).unwrap();
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();
        graph.grant(RoleId(2), ResourceId(1), [WRITE]).unwrap();

        assert!(graph.has_permission(RoleId(2), ResourceId(1), READ).unwrap());
        assert!(graph.has_permission(RoleId(2), ResourceId(1), WRITE).unwrap());
        assert!(!graph.has_permission(RoleId(1), ResourceId(1), WRITE).unwrap());
        assert!(graph
            .has_permission_named(RoleId(2), ResourceId(1), "read")
            .unwrap());
        assert!(!graph
            .has_permission_named(RoleId(2), ResourceId(1), "nope")
            .unwrap());
    }

    #[test]
    fn test_add_parent_rejects_cycles() {
        let mut graph = base_graph();
        add_roles(&mut graph, &[1, 2, 3]);
        graph.add_parent(RoleId(2), RoleId(1)).unwrap();
        graph.add_parent(RoleId(3), RoleId(2)).unwrap();

        let err = graph.add_parent(RoleId(1), RoleId(3)).unwrap_err();
        assert_eq!(
            err,
            AclError::CyclicInheritance {
                role: RoleId(1),
                parent: RoleId(3)
            }
        );
        assert!(graph.parents_of(RoleId(1)).unwrap().is_empty());

        // self edge
        assert!(matches!(
            graph.add_parent(RoleId(2), RoleId(2)),
            Err(AclError::CyclicInheritance { .. })
        ));
    }

    #[test]
    fn test_add_parent_is_idempotent() {
        let mut graph = base_graph();
        add_roles(&mut graph, &[1, 2]);
        assert!(graph.add_parent(RoleId(2), RoleId(1)).unwrap());
        assert!(!graph.add_parent(RoleId(2), RoleId(1)).unwrap());
        assert_eq!(graph.parents_of(RoleId(2)).unwrap(), vec![RoleId(1)]);
    }

    #[test]
    fn test_add_parent_unknown_roles() {
        let mut graph = base_graph();
        add_roles(&mut graph, &[1]);
        assert_eq!(
            graph.add_parent(RoleId(1), RoleId(9)),
            Err(AclError::UnknownRole(RoleId(9)))
        );
        assert_eq!(
            graph.add_parent(RoleId(9), RoleId(1)),
            Err(AclError::UnknownRole(RoleId(9)))
        );
    }

    #[test]
    fn test_add_parents_reports_each_edge() {
        let mut graph = base_graph();
        add_roles(&mut graph, &[1, 2, 3]);
        graph.add_parent(RoleId(1), RoleId(3)).unwrap();

        let outcomes = graph.add_parents(RoleId(3), [RoleId(2), RoleId(1), RoleId(7)]);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0], (RoleId(2), Ok(true)));
        assert!(matches!(outcomes[1].1, Err(AclError::CyclicInheritance { .. })));
        assert_eq!(outcomes[2].1, Err(AclError::UnknownRole(RoleId(7))));
        assert_eq!(graph.parents_of(RoleId(3)).unwrap(), vec![RoleId(2)]);
    }

    #[test]
    fn test_remove_parent() {
        let mut graph = base_graph();
        add_roles(&mut graph, &[1, 2]);
        graph.add_parent(RoleId(2), RoleId(1)).unwrap();

        assert!(graph.remove_parent(RoleId(2), RoleId(1)).unwrap());
        assert!(!graph.remove_parent(RoleId(2), RoleId(1)).unwrap());
        assert!(!graph.remove_parent(RoleId(2), RoleId(42)).unwrap());
        assert_eq!(
            graph.remove_parent(RoleId(42), RoleId(1)),
            Err(AclError::UnknownRole(RoleId(42)))
        );
    }

    #[test]
    fn test_diamond_closure_and_merge() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        // C(4) -> A(2), B(3) -> R(1)
        add_roles(&mut graph, &[1, 2, 3, 4]);
        graph.add_parent(RoleId(2), RoleId(1)).unwrap();
        graph.add_parent(RoleId(3), RoleId(1)).unwrap();
        graph.add_parent(RoleId(4), RoleId(2)).unwrap();
        graph.add_parent(RoleId(4), RoleId(3)).unwrap();
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();

        let c = graph.role(RoleId(4)).unwrap();
        let closure = c.ancestor_closure();
        assert_eq!(closure.len(), 4);
        assert_eq!(closure.iter().filter(|id| **id == RoleId(1)).count(), 1);

        let effective = c.effective_resources();
        assert_eq!(effective.len(), 1);
        assert_eq!(effective[&ResourceId(1)].permissions().len(), 1);
    }

    #[test]
    fn test_union_merge_across_parents() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        add_roles(&mut graph, &[1, 2, 3]);
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();
        graph.grant(RoleId(2), ResourceId(1), [WRITE]).unwrap();
        graph.add_parent(RoleId(3), RoleId(1)).unwrap();
        graph.add_parent(RoleId(3), RoleId(2)).unwrap();

        assert!(graph.has_permission(RoleId(3), ResourceId(1), READ).unwrap());
        assert!(graph.has_permission(RoleId(3), ResourceId(1), WRITE).unwrap());

        let effective = graph.effective_resources(RoleId(3)).unwrap();
        let ids: Vec<PermissionId> = effective[&ResourceId(1)].permissions().ids().collect();
        assert_eq!(ids, vec![READ, WRITE]);
    }

    #[test]
    fn test_direct_grant_replaces() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        add_roles(&mut graph, &[1, 2]);
        graph.add_parent(RoleId(2), RoleId(1)).unwrap();

        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();
        graph.grant(RoleId(1), ResourceId(1), [WRITE]).unwrap();

        let direct = graph.role(RoleId(1)).unwrap().grant(ResourceId(1)).cloned().unwrap();
        assert_eq!(direct.permissions().ids().collect::<Vec<_>>(), vec![WRITE]);
        assert!(!graph.has_permission(RoleId(2), ResourceId(1), READ).unwrap());
        assert!(graph.has_permission(RoleId(2), ResourceId(1), WRITE).unwrap());
    }

    #[test]
    fn test_grant_rejects_foreign_permission_without_partial_state() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        add_roles(&mut graph, &[1]);
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();

        let err = graph
            .grant(RoleId(1), ResourceId(1), [WRITE, SSH])
            .unwrap_err();
        assert_eq!(
            err,
            AclError::UnknownPermission {
                resource_type: DOC,
                permission: SSH
            }
        );
        let direct = graph.role(RoleId(1)).unwrap().grant(ResourceId(1)).cloned().unwrap();
        assert_eq!(direct.permissions().ids().collect::<Vec<_>>(), vec![READ]);
    }

    #[test]
    fn test_grant_all_uses_full_vocabulary() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        add_roles(&mut graph, &[1]);
        graph.grant_all(RoleId(1), ResourceId(1)).unwrap();

        for perm in [READ, WRITE, EDIT] {
            assert!(graph.has_permission(RoleId(1), ResourceId(1), perm).unwrap());
        }
        assert!(!graph.has_permission(RoleId(1), ResourceId(1), SSH).unwrap());
    }

    #[test]
    fn test_revoke() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        add_roles(&mut graph, &[1]);
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();

        assert!(graph.revoke(RoleId(1), ResourceId(1)).unwrap());
        assert!(!graph.revoke(RoleId(1), ResourceId(1)).unwrap());
        assert!(!graph.has_permission(RoleId(1), ResourceId(1), READ).unwrap());
    }

    #[test]
    fn test_group_grants_reach_members() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        graph
            .register_resource(Resource::group(ResourceId(100), "G", DOC))
            .unwrap();
        graph
            .register_resource(Resource::group(ResourceId(101), "G2", DOC))
            .unwrap();
        graph.add_member(ResourceId(100), ResourceId(1)).unwrap();
        add_roles(&mut graph, &[1]);
        graph.grant(RoleId(1), ResourceId(100), [EDIT]).unwrap();

        assert!(graph.has_permission(RoleId(1), ResourceId(1), EDIT).unwrap());

        graph.add_member(ResourceId(101), ResourceId(1)).unwrap();
        assert!(graph.has_permission(RoleId(1), ResourceId(1), EDIT).unwrap());
        assert!(!graph.has_permission(RoleId(1), ResourceId(1), READ).unwrap());
    }

    #[test]
    fn test_nested_groups_resolve_transitively() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        graph
            .register_resource(Resource::group(ResourceId(100), "inner", DOC))
            .unwrap();
        graph
            .register_resource(Resource::group(ResourceId(200), "outer", DOC))
            .unwrap();
        graph.add_member(ResourceId(100), ResourceId(1)).unwrap();
        graph.add_member(ResourceId(200), ResourceId(100)).unwrap();
        // cycle between groups must not loop
        graph.add_member(ResourceId(100), ResourceId(200)).unwrap();

        add_roles(&mut graph, &[1, 2]);
        graph.add_parent(RoleId(2), RoleId(1)).unwrap();
        graph.grant(RoleId(1), ResourceId(200), [READ]).unwrap();

        assert!(graph.has_permission(RoleId(2), ResourceId(1), READ).unwrap());
        assert_eq!(
            graph.containing_groups(ResourceId(1)),
            BTreeSet::from([ResourceId(100), ResourceId(200)])
        );
        assert_eq!(
            graph.expand_group(ResourceId(200)),
            BTreeSet::from([ResourceId(1), ResourceId(100)])
        );
        let effective = graph.role(RoleId(2)).unwrap().effective_permissions(ResourceId(1));
        assert!(effective.has(READ));
    }

    #[test]
    fn test_membership_type_checks() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        graph
            .register_resource(Resource::new(ResourceId(2), "db-01", HOST))
            .unwrap();
        graph
            .register_resource(Resource::group(ResourceId(100), "docs", DOC))
            .unwrap();

        assert!(matches!(
            graph.add_member(ResourceId(100), ResourceId(2)),
            Err(AclError::TypeMismatch(_))
        ));
        assert!(matches!(
            graph.add_member(ResourceId(1), ResourceId(100)),
            Err(AclError::TypeMismatch(_))
        ));
        assert_eq!(
            graph.add_member(ResourceId(100), ResourceId(9)),
            Err(AclError::UnknownResource(ResourceId(9)))
        );
        assert!(graph.containing_groups(ResourceId(2)).is_empty());
    }

    #[test]
    fn test_remove_member() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        graph
            .register_resource(Resource::group(ResourceId(100), "G", DOC))
            .unwrap();
        graph.add_member(ResourceId(100), ResourceId(1)).unwrap();
        add_roles(&mut graph, &[1]);
        graph.grant(RoleId(1), ResourceId(100), [READ]).unwrap();

        assert!(graph.remove_member(ResourceId(100), ResourceId(1)).unwrap());
        assert!(!graph.remove_member(ResourceId(100), ResourceId(1)).unwrap());
        assert!(!graph.has_permission(RoleId(1), ResourceId(1), READ).unwrap());
    }

    #[test]
    fn test_register_group_with_members() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        let doc = graph.resource(ResourceId(1)).cloned().unwrap();
        let mut group = Resource::group(ResourceId(100), "G", DOC);
        group.add_member(&doc).unwrap();
        graph.register_resource(group).unwrap();
        assert_eq!(
            graph.containing_groups(ResourceId(1)),
            BTreeSet::from([ResourceId(100)])
        );

        let mut dangling = Resource::group(ResourceId(101), "G2", DOC);
        dangling
            .add_member(&Resource::new(ResourceId(55), "ghost", DOC))
            .unwrap();
        assert_eq!(
            graph.register_resource(dangling),
            Err(AclError::UnknownResource(ResourceId(55)))
        );
        assert!(graph.resource(ResourceId(101)).is_none());
    }

    #[test]
    fn test_register_resource_errors() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        assert_eq!(
            graph.register_resource(Resource::new(ResourceId(1), "again", DOC)),
            Err(AclError::DuplicateRegistration {
                kind: "resource",
                id: 1
            })
        );
        assert_eq!(
            graph.register_resource(Resource::new(ResourceId(2), "x", ResourceTypeId(77))),
            Err(AclError::UnknownResourceType(ResourceTypeId(77)))
        );
    }

    #[test]
    fn test_register_resources_is_per_item() {
        let mut graph = base_graph();
        let outcomes = graph.register_resources(vec![
            Resource::new(ResourceId(1), "a", DOC),
            Resource::new(ResourceId(1), "dup", DOC),
            Resource::new(ResourceId(2), "b", ResourceTypeId(99)),
            Resource::new(ResourceId(3), "c", HOST),
        ]);
        let ok: Vec<ResourceId> = outcomes
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(ok, vec![ResourceId(1), ResourceId(3)]);
        assert_eq!(graph.resource(ResourceId(1)).unwrap().name, "a");
        assert!(graph.resource(ResourceId(2)).is_none());
    }

    #[test]
    fn test_remove_resource_keeps_grants_but_leaves_groups() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        graph
            .register_resource(Resource::group(ResourceId(100), "G", DOC))
            .unwrap();
        graph.add_member(ResourceId(100), ResourceId(1)).unwrap();
        add_roles(&mut graph, &[1]);
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();

        let removed = graph.remove_resource(ResourceId(1)).unwrap();
        assert_eq!(removed.id, ResourceId(1));
        assert!(!graph.resource(ResourceId(100)).unwrap().has_member(ResourceId(1)));
        assert_eq!(graph.roles_granting(ResourceId(1)), vec![RoleId(1)]);
        assert_eq!(
            graph.remove_resource(ResourceId(1)),
            Err(AclError::UnknownResource(ResourceId(1)))
        );
    }

    #[test]
    fn test_reregistered_id_of_other_type_drops_old_grants() {
        let mut graph = base_graph();
        add_doc(&mut graph, 5);
        add_doc(&mut graph, 6);
        add_roles(&mut graph, &[1]);
        graph.grant(RoleId(1), ResourceId(5), [READ]).unwrap();
        graph.grant(RoleId(1), ResourceId(6), [WRITE]).unwrap();
        graph.remove_resource(ResourceId(5)).unwrap();
        graph.remove_resource(ResourceId(6)).unwrap();

        graph
            .register_resource(Resource::new(ResourceId(5), "db-05", HOST))
            .unwrap();
        assert!(!graph.has_permission(RoleId(1), ResourceId(5), READ).unwrap());
        assert!(graph.roles_granting(ResourceId(5)).is_empty());
        assert!(graph.effective_roles_for(ResourceId(5), READ).is_empty());

        // same type: the grant applies again
        add_doc(&mut graph, 6);
        assert!(graph.has_permission(RoleId(1), ResourceId(6), WRITE).unwrap());
    }

    #[test]
    fn test_remove_resource_type_strips_grants_on_removed_resources() {
        let mut graph = base_graph();
        add_doc(&mut graph, 5);
        add_roles(&mut graph, &[1]);
        graph.grant(RoleId(1), ResourceId(5), [READ]).unwrap();
        graph.remove_resource(ResourceId(5)).unwrap();

        graph.remove_resource_type(DOC).unwrap();
        assert!(graph.role(RoleId(1)).unwrap().resources().is_empty());
        assert!(graph.permission(READ).is_none());
        assert_eq!(graph.stats().grants, 0);
    }

    #[test]
    fn test_remove_group_clears_membership_index() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        graph
            .register_resource(Resource::group(ResourceId(100), "G", DOC))
            .unwrap();
        graph.add_member(ResourceId(100), ResourceId(1)).unwrap();
        add_roles(&mut graph, &[1]);
        graph.grant(RoleId(1), ResourceId(100), [READ]).unwrap();

        graph.remove_resource(ResourceId(100)).unwrap();
        assert!(graph.containing_groups(ResourceId(1)).is_empty());
        assert!(!graph.has_permission(RoleId(1), ResourceId(1), READ).unwrap());
    }

    #[test]
    fn test_purge_resource_strips_grants() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        add_roles(&mut graph, &[1, 2]);
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();
        graph.grant(RoleId(2), ResourceId(1), [WRITE]).unwrap();

        graph.purge_resource(ResourceId(1)).unwrap();
        assert!(graph.roles_granting(ResourceId(1)).is_empty());
    }

    #[test]
    fn test_remove_resource_type_cascades() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        graph
            .register_resource(Resource::group(ResourceId(100), "G", DOC))
            .unwrap();
        graph.add_member(ResourceId(100), ResourceId(1)).unwrap();
        graph
            .register_resource(Resource::new(ResourceId(2), "db-01", HOST))
            .unwrap();
        add_roles(&mut graph, &[1, 2]);
        graph.add_parent(RoleId(2), RoleId(1)).unwrap();
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();
        graph.grant(RoleId(1), ResourceId(100), [EDIT]).unwrap();
        graph.grant(RoleId(1), ResourceId(2), [SSH]).unwrap();

        let removed = graph.remove_resource_type(DOC).unwrap();
        assert_eq!(removed.name, "document");

        assert!(graph.resource(ResourceId(1)).is_none());
        assert!(graph.resource(ResourceId(100)).is_none());
        assert!(graph.permission(READ).is_none());
        assert_eq!(graph.role(RoleId(1)).unwrap().resources().len(), 1);
        assert!(!graph.has_permission(RoleId(2), ResourceId(1), READ).unwrap());
        assert!(!graph.has_permission(RoleId(2), ResourceId(1), EDIT).unwrap());
        assert!(graph.has_permission(RoleId(2), ResourceId(2), SSH).unwrap());

        assert_eq!(
            graph.remove_resource_type(DOC),
            Err(AclError::UnknownResourceType(DOC))
        );
    }

    #[test]
    fn test_remove_permission_strips_grants() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        add_roles(&mut graph, &[1]);
        graph.grant(RoleId(1), ResourceId(1), [READ, WRITE]).unwrap();

        assert!(graph.remove_permission(DOC, READ).unwrap());
        assert!(!graph.remove_permission(DOC, READ).unwrap());

        let direct = graph.role(RoleId(1)).unwrap().grant(ResourceId(1)).cloned().unwrap();
        assert_eq!(direct.permissions().ids().collect::<Vec<_>>(), vec![WRITE]);
        assert!(!graph.resource_type(DOC).unwrap().has_permission(READ));
        assert!(graph.permission(READ).is_none());
        assert_eq!(
            graph.grant(RoleId(1), ResourceId(1), [READ]),
            Err(AclError::UnknownPermission {
                resource_type: DOC,
                permission: READ
            })
        );
    }

    #[test]
    fn test_add_permission_errors() {
        let mut graph = base_graph();
        assert_eq!(
            graph.add_permission(Permission::new(PermissionId(50), "x", ResourceTypeId(9))),
            Err(AclError::UnknownResourceType(ResourceTypeId(9)))
        );
        assert_eq!(
            graph.add_permission(Permission::new(READ, "again", DOC)),
            Err(AclError::DuplicateRegistration {
                kind: "permission",
                id: 1
            })
        );
        assert_eq!(graph.resource_type(DOC).unwrap().permissions().len(), 3);
    }

    #[test]
    fn test_add_resource_type_with_vocabulary() {
        let mut graph = base_graph();
        let json = serde_json::json!({
            "id": 3,
            "name": "ticket",
            "permissions": { "30": "close", "31": "comment" }
        });
        let rt: ResourceType = serde_json::from_value(json).unwrap();
        graph.add_resource_type(rt).unwrap();
        assert_eq!(graph.catalog().for_type(ResourceTypeId(3)).count(), 2);

        let clash: ResourceType = serde_json::from_value(serde_json::json!({
            "id": 4,
            "name": "clash",
            "permissions": { "1": "read" }
        }))
        .unwrap();
        assert_eq!(
            graph.add_resource_type(clash),
            Err(AclError::DuplicateRegistration {
                kind: "permission",
                id: 1
            })
        );
        assert!(graph.resource_type(ResourceTypeId(4)).is_none());
    }

    #[test]
    fn test_remove_role_detaches_children() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        add_roles(&mut graph, &[1, 2, 3]);
        graph.add_parent(RoleId(2), RoleId(1)).unwrap();
        graph.add_parent(RoleId(3), RoleId(1)).unwrap();
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();

        let removed = graph.remove_role(RoleId(1)).unwrap();
        assert_eq!(removed.id, RoleId(1));
        for child in [RoleId(2), RoleId(3)] {
            assert!(graph.parents_of(child).unwrap().is_empty());
            assert!(!graph.has_permission(child, ResourceId(1), READ).unwrap());
        }
        assert_eq!(
            graph.has_permission(RoleId(1), ResourceId(1), READ),
            Err(AclError::UnknownRole(RoleId(1)))
        );
        assert_eq!(
            graph.remove_role(RoleId(1)).unwrap_err(),
            AclError::UnknownRole(RoleId(1))
        );
    }

    #[test]
    fn test_register_role_duplicate() {
        let mut graph = base_graph();
        add_roles(&mut graph, &[1]);
        assert_eq!(
            graph.register_role(Role::new(RoleId(1), "other")),
            Err(AclError::DuplicateRegistration { kind: "role", id: 1 })
        );
        assert_eq!(graph.role(RoleId(1)).unwrap().name, "role-1");
    }

    #[test]
    fn test_descendants_and_reverse_lookups() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        add_roles(&mut graph, &[1, 2, 3, 4]);
        graph.add_parent(RoleId(2), RoleId(1)).unwrap();
        graph.add_parent(RoleId(3), RoleId(2)).unwrap();
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();

        assert_eq!(
            graph.descendants_of(RoleId(1)).unwrap(),
            BTreeSet::from([RoleId(2), RoleId(3)])
        );
        assert!(graph.descendants_of(RoleId(4)).unwrap().is_empty());
        assert_eq!(graph.roles_granting(ResourceId(1)), vec![RoleId(1)]);
        assert_eq!(
            graph.effective_roles_for(ResourceId(1), READ),
            vec![RoleId(1), RoleId(2), RoleId(3)]
        );
    }

    #[test]
    fn test_name_lookups() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        graph.register_role(Role::new(RoleId(1), "Viewer")).unwrap();

        assert_eq!(graph.role_by_name("Viewer").map(|r| r.id), Some(RoleId(1)));
        assert!(graph.role_by_name("Nobody").is_none());
        assert_eq!(
            graph.resource_by_name("doc-1").map(|r| r.id),
            Some(ResourceId(1))
        );
        assert_eq!(graph.permission_id_for(ResourceId(1), "write"), Some(WRITE));
        assert_eq!(graph.permission_id_for(ResourceId(1), "ssh"), None);
    }

    #[test]
    fn test_unknown_resource_queries_are_false() {
        let mut graph = base_graph();
        add_roles(&mut graph, &[1]);
        assert!(!graph.has_permission(RoleId(1), ResourceId(404), READ).unwrap());
        assert!(graph.effective_resources(RoleId(1)).unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let mut graph = base_graph();
        add_doc(&mut graph, 1);
        graph
            .register_resource(Resource::group(ResourceId(100), "G", DOC))
            .unwrap();
        add_roles(&mut graph, &[1, 2]);
        graph.add_parent(RoleId(2), RoleId(1)).unwrap();
        graph.grant(RoleId(1), ResourceId(1), [READ]).unwrap();

        let stats = graph.stats();
        assert_eq!(
            stats,
            GraphStats {
                roles: 2,
                parent_edges: 1,
                resources: 2,
                groups: 1,
                resource_types: 2,
                permissions: 4,
                grants: 1,
            }
        );
    }
}

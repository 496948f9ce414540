//! # Resources
//!
//! Resource types, resources and resource groups.
//!
//! A resource type is a named permission vocabulary. A resource is an
//! addressable protected entity of one type; a resource group is a resource
//! that additionally contains other resources of the same type. Membership
//! is containment only: a resource may sit in several groups, and a group
//! carries no permissions of its own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{AclError, AclResult};
use crate::ids::{PermissionId, ResourceId, ResourceTypeId};
use crate::permissions::{Permission, PermissionSet};

/// A named permission vocabulary shared by a family of resources.
///
/// Permissions outside a type's vocabulary can never be granted on its
/// resources. The vocabulary is changed through
/// [`AuthorizationGraph::add_permission`](crate::graph::AuthorizationGraph::add_permission)
/// and
/// [`AuthorizationGraph::remove_permission`](crate::graph::AuthorizationGraph::remove_permission)
/// so that the catalog and existing grants stay consistent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceType {
    /// Unique resource type id.
    pub id: ResourceTypeId,
    /// Type name (e.g. "document").
    pub name: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    permissions: PermissionSet,
}

impl ResourceType {
    /// Create a resource type with an empty vocabulary.
    pub fn new(id: ResourceTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            permissions: PermissionSet::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The permission vocabulary of this type.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Check if a permission id belongs to this type.
    pub fn has_permission(&self, id: PermissionId) -> bool {
        self.permissions.has(id)
    }

    /// Build the subset of this vocabulary named by `ids`.
    ///
    /// # Errors
    ///
    /// `UnknownPermission` for the first id that is not part of the
    /// vocabulary. Nothing is built in that case.
    pub fn subset<I>(&self, ids: I) -> AclResult<PermissionSet>
    where
        I: IntoIterator<Item = PermissionId>,
    {
        let mut subset = PermissionSet::new();
        for id in ids {
            match self.permissions.name_of(id) {
                Some(name) => subset.add(id, name),
                None => {
                    return Err(AclError::UnknownPermission {
                        resource_type: self.id,
                        permission: id,
                    })
                }
            }
        }
        Ok(subset)
    }

    pub(crate) fn insert_permission(&mut self, permission: &Permission) {
        self.permissions.add(permission.id, permission.name.clone());
    }

    pub(crate) fn remove_permission(&mut self, id: PermissionId) -> bool {
        self.permissions.remove(id)
    }
}

/// Whether a resource is a plain entity or a group of other resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceKind {
    /// A single protected entity.
    Plain,
    /// A group containing other resources of the same type.
    Group {
        /// Direct members of the group.
        #[serde(default)]
        members: BTreeSet<ResourceId>,
    },
}

/// An addressable protected entity.
///
/// # Example
///
/// ```
/// use acl_graph::ids::{ResourceId, ResourceTypeId};
/// use acl_graph::resources::Resource;
///
/// let doc = Resource::new(ResourceId(1), "handbook.pdf", ResourceTypeId(1));
/// let mut folder = Resource::group(ResourceId(2), "policies", ResourceTypeId(1));
///
/// assert!(folder.add_member(&doc).unwrap());
/// assert!(folder.is_group());
/// assert!(!doc.is_group());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    /// Unique resource id.
    pub id: ResourceId,
    /// Resource name.
    pub name: String,
    /// The resource type defining this resource's permission vocabulary.
    pub resource_type: ResourceTypeId,
    /// Opaque key of the protected content in the owning application.
    #[serde(default)]
    pub content_id: String,
    #[serde(flatten)]
    kind: ResourceKind,
}

impl Resource {
    /// Create a plain resource.
    pub fn new(id: ResourceId, name: impl Into<String>, resource_type: ResourceTypeId) -> Self {
        Self {
            id,
            name: name.into(),
            resource_type,
            content_id: String::new(),
            kind: ResourceKind::Plain,
        }
    }

    /// Create an empty resource group.
    pub fn group(id: ResourceId, name: impl Into<String>, resource_type: ResourceTypeId) -> Self {
        Self {
            kind: ResourceKind::Group {
                members: BTreeSet::new(),
            },
            ..Self::new(id, name, resource_type)
        }
    }

    /// Set the external content key.
    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = content_id.into();
        self
    }

    /// Check if this resource is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ResourceKind::Group { .. })
    }

    /// Plain or group.
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Direct members, or `None` for a plain resource.
    pub fn members(&self) -> Option<&BTreeSet<ResourceId>> {
        match &self.kind {
            ResourceKind::Group { members } => Some(members),
            ResourceKind::Plain => None,
        }
    }

    /// Check if `id` is a direct member of this group.
    pub fn has_member(&self, id: ResourceId) -> bool {
        self.members().is_some_and(|m| m.contains(&id))
    }

    /// Add a resource to this group.
    ///
    /// # Returns
    ///
    /// `true` if the member was newly added
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if this resource is not a group, or if the candidate's
    /// resource type differs from the group's.
    pub fn add_member(&mut self, member: &Resource) -> AclResult<bool> {
        self.check_member(member)?;
        Ok(self.attach_member(member.id))
    }

    /// Remove a resource from this group.
    ///
    /// # Returns
    ///
    /// `true` if the member was present
    ///
    /// # Errors
    ///
    /// Same conditions as [`Resource::add_member`].
    pub fn remove_member(&mut self, member: &Resource) -> AclResult<bool> {
        self.check_member(member)?;
        Ok(self.detach_member(member.id))
    }

    /// Check that `member` may be placed in this group.
    pub(crate) fn check_member(&self, member: &Resource) -> AclResult<()> {
        if !self.is_group() {
            return Err(self.not_a_group());
        }
        if member.resource_type != self.resource_type {
            return Err(AclError::TypeMismatch(format!(
                "resource {} has type {}, group {} has type {}",
                member.id, member.resource_type, self.id, self.resource_type
            )));
        }
        Ok(())
    }

    pub(crate) fn attach_member(&mut self, id: ResourceId) -> bool {
        match &mut self.kind {
            ResourceKind::Group { members } => members.insert(id),
            ResourceKind::Plain => false,
        }
    }

    /// Drop a member id without type checks (used when the member itself is
    /// being removed from the graph).
    pub(crate) fn detach_member(&mut self, id: ResourceId) -> bool {
        match &mut self.kind {
            ResourceKind::Group { members } => members.remove(&id),
            ResourceKind::Plain => false,
        }
    }

    fn not_a_group(&self) -> AclError {
        AclError::TypeMismatch(format!("resource {} is not a group", self.id))
    }
}

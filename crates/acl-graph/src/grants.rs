//! # Grants
//!
//! A [`ResPermsPair`] binds a subset of a resource type's permissions to a
//! single resource. Roles own their grants; the pair itself does not know
//! which role holds it.

use serde::{Deserialize, Serialize};

use crate::error::{AclError, AclResult};
use crate::ids::{PermissionId, ResourceId, ResourceTypeId};
use crate::permissions::PermissionSet;
use crate::resources::{Resource, ResourceType};

/// "May exercise these permissions on this resource."
///
/// The permission set is always a subset of the resource type's vocabulary;
/// construction validates every id before anything is built.
///
/// # Example
///
/// ```
/// use acl_graph::grants::ResPermsPair;
/// use acl_graph::ids::{PermissionId, ResourceId, ResourceTypeId};
/// use acl_graph::permissions::Permission;
/// use acl_graph::resources::{Resource, ResourceType};
/// use acl_graph::AuthorizationGraph;
///
/// let mut graph = AuthorizationGraph::new();
/// graph.add_resource_type(ResourceType::new(ResourceTypeId(1), "document")).unwrap();
/// graph.add_permission(Permission::new(PermissionId(1), "read", ResourceTypeId(1))).unwrap();
/// graph.add_permission(Permission::new(PermissionId(2), "write", ResourceTypeId(1))).unwrap();
///
/// let doc = Resource::new(ResourceId(10), "doc", ResourceTypeId(1));
/// let rt = graph.resource_type(ResourceTypeId(1)).unwrap();
///
/// let pair = ResPermsPair::new(&doc, rt, [PermissionId(1)]).unwrap();
/// assert!(pair.has(PermissionId(1)));
/// assert!(!pair.has(PermissionId(2)));
///
/// // No explicit subset: the whole vocabulary
/// let full = ResPermsPair::full(&doc, rt).unwrap();
/// assert_eq!(full.permissions().len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResPermsPair {
    resource: ResourceId,
    resource_type: ResourceTypeId,
    permissions: PermissionSet,
}

impl ResPermsPair {
    /// Create a grant of `ids` on `resource`.
    ///
    /// # Errors
    ///
    /// * `TypeMismatch` if `resource_type` is not the resource's type
    /// * `UnknownPermission` if any id is outside the type's vocabulary
    pub fn new<I>(resource: &Resource, resource_type: &ResourceType, ids: I) -> AclResult<Self>
    where
        I: IntoIterator<Item = PermissionId>,
    {
        Self::check_type(resource, resource_type)?;
        Ok(Self {
            resource: resource.id,
            resource_type: resource_type.id,
            permissions: resource_type.subset(ids)?,
        })
    }

    /// Create a grant of every permission in the resource type's vocabulary.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `resource_type` is not the resource's type.
    pub fn full(resource: &Resource, resource_type: &ResourceType) -> AclResult<Self> {
        Self::check_type(resource, resource_type)?;
        Ok(Self {
            resource: resource.id,
            resource_type: resource_type.id,
            permissions: resource_type.permissions().clone(),
        })
    }

    /// The granted resource.
    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    /// The type of the granted resource.
    pub fn resource_type(&self) -> ResourceTypeId {
        self.resource_type
    }

    /// The granted permissions.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Check if the grant includes a permission.
    pub fn has(&self, id: PermissionId) -> bool {
        self.permissions.has(id)
    }

    /// Union another grant on the same resource into this one.
    pub(crate) fn merge(&mut self, other: &ResPermsPair) {
        self.permissions.merge(&other.permissions);
    }

    pub(crate) fn strip(&mut self, id: PermissionId) -> bool {
        self.permissions.remove(id)
    }

    fn check_type(resource: &Resource, resource_type: &ResourceType) -> AclResult<()> {
        if resource.resource_type != resource_type.id {
            return Err(AclError::TypeMismatch(format!(
                "resource {} has type {}, not {}",
                resource.id, resource.resource_type, resource_type.id
            )));
        }
        Ok(())
    }
}

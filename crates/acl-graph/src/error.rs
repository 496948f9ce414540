//! Error types for graph operations
//!
//! Every mutating operation on the authorization graph either succeeds
//! completely or fails with one of these errors and leaves the graph
//! untouched.

use thiserror::Error;

use crate::ids::{PermissionId, ResourceId, ResourceTypeId, RoleId};

/// Authorization graph error types.
///
/// All variants are local, recoverable conditions reported to the caller of
/// the operation that triggered them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
    /// Adding the parent edge would make a role its own ancestor
    #[error("Cyclic inheritance: role {role} cannot inherit from {parent}")]
    CyclicInheritance {
        /// Role that would receive the parent edge.
        role: RoleId,
        /// Requested parent.
        parent: RoleId,
    },

    /// A grant references a permission outside the resource type vocabulary
    #[error("Unknown permission {permission} for resource type {resource_type}")]
    UnknownPermission {
        /// Resource type whose vocabulary was consulted.
        resource_type: ResourceTypeId,
        /// Offending permission id.
        permission: PermissionId,
    },

    /// Resource types differ, or an entity of the wrong kind was supplied
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Role id is not registered
    #[error("Unknown role: {0}")]
    UnknownRole(RoleId),

    /// Resource id is not registered
    #[error("Unknown resource: {0}")]
    UnknownResource(ResourceId),

    /// Resource type id is not registered
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(ResourceTypeId),

    /// An entity with the same id is already registered
    #[error("Duplicate registration: {kind} {id} is already registered")]
    DuplicateRegistration {
        /// Entity namespace ("role", "resource", ...).
        kind: &'static str,
        /// Conflicting id.
        id: i64,
    },
}

/// Result type for graph operations.
pub type AclResult<T> = Result<T, AclError>;

impl AclError {
    /// Check if this error reports a reference to a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AclError::UnknownRole(_)
                | AclError::UnknownResource(_)
                | AclError::UnknownResourceType(_)
        )
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AclError::CyclicInheritance { .. } => "CYCLIC_INHERITANCE",
            AclError::UnknownPermission { .. } => "UNKNOWN_PERMISSION",
            AclError::TypeMismatch(_) => "TYPE_MISMATCH",
            AclError::UnknownRole(_) => "UNKNOWN_ROLE",
            AclError::UnknownResource(_) => "UNKNOWN_RESOURCE",
            AclError::UnknownResourceType(_) => "UNKNOWN_RESOURCE_TYPE",
            AclError::DuplicateRegistration { .. } => "DUPLICATE_REGISTRATION",
        }
    }
}

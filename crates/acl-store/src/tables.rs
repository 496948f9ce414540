//! # Tables
//!
//! Row shapes of the seven persisted tables the graph is built from.
//!
//! ```text
//! permission                id, name, description, resource_type_id
//! resource_type             id, name, description
//! resource                  id, name, resource_type_id, content_id, is_group
//! role                      id, name, is_login
//! role_memberof             child_role_id, parent_role_id
//! role_permission_resource  role_id, resource_id, permission_id
//! group_resource            group_id, member_resource_id
//! ```

use acl_graph::{PermissionId, ResourceId, ResourceTypeId, RoleId};
use serde::{Deserialize, Serialize};

/// Logical table names, in the order the loader reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Permission,
    ResourceType,
    Resource,
    Role,
    RoleMemberOf,
    RolePermissionResource,
    GroupResource,
}

impl Table {
    /// Every table, in load order.
    pub const ALL: [Table; 7] = [
        Table::Permission,
        Table::ResourceType,
        Table::Resource,
        Table::Role,
        Table::RoleMemberOf,
        Table::RolePermissionResource,
        Table::GroupResource,
    ];

    /// Table name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Permission => "permission",
            Table::ResourceType => "resource_type",
            Table::Resource => "resource",
            Table::Role => "role",
            Table::RoleMemberOf => "role_memberof",
            Table::RolePermissionResource => "role_permission_resource",
            Table::GroupResource => "group_resource",
        }
    }

    /// Whether an empty table means the data is unusable.
    ///
    /// Relation tables may legitimately be empty.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Table::Permission | Table::ResourceType | Table::Resource | Table::Role
        )
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `permission` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionRow {
    pub id: PermissionId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub resource_type_id: ResourceTypeId,
}

/// `resource_type` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceTypeRow {
    pub id: ResourceTypeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// `resource` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceRow {
    pub id: ResourceId,
    pub name: String,
    pub resource_type_id: ResourceTypeId,
    #[serde(default)]
    pub content_id: String,
    #[serde(default)]
    pub is_group: bool,
}

/// `role` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRow {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub is_login: bool,
}

/// `role_memberof` row: the child role inherits from the parent role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleMemberOfRow {
    pub child_role_id: RoleId,
    pub parent_role_id: RoleId,
}

/// `role_permission_resource` row: one permission of one grant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RolePermissionResourceRow {
    pub role_id: RoleId,
    pub resource_id: ResourceId,
    pub permission_id: PermissionId,
}

/// `group_resource` row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupResourceRow {
    pub group_id: ResourceId,
    pub member_resource_id: ResourceId,
}

/// The full contents of every table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tables {
    #[serde(default)]
    pub permission: Vec<PermissionRow>,
    #[serde(default)]
    pub resource_type: Vec<ResourceTypeRow>,
    #[serde(default)]
    pub resource: Vec<ResourceRow>,
    #[serde(default)]
    pub role: Vec<RoleRow>,
    #[serde(default)]
    pub role_memberof: Vec<RoleMemberOfRow>,
    #[serde(default)]
    pub role_permission_resource: Vec<RolePermissionResourceRow>,
    #[serde(default)]
    pub group_resource: Vec<GroupResourceRow>,
}

impl Tables {
    /// Number of rows in a table.
    pub fn row_count(&self, table: Table) -> usize {
        match table {
            Table::Permission => self.permission.len(),
            Table::ResourceType => self.resource_type.len(),
            Table::Resource => self.resource.len(),
            Table::Role => self.role.len(),
            Table::RoleMemberOf => self.role_memberof.len(),
            Table::RolePermissionResource => self.role_permission_resource.len(),
            Table::GroupResource => self.group_resource.len(),
        }
    }

    /// First required table with no rows, if any.
    pub fn first_empty_required(&self) -> Option<Table> {
        Table::ALL
            .into_iter()
            .find(|t| t.is_required() && self.row_count(*t) == 0)
    }
}

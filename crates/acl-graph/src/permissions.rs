//! # Permissions
//!
//! The permission catalog and permission sets.
//!
//! Every permission belongs to exactly one resource type. The catalog is the
//! registry of all permissions known to the graph; a [`PermissionSet`] is a
//! subset of one type's vocabulary, keyed by permission id with the
//! permission name carried alongside for display and name lookups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AclError, AclResult};
use crate::ids::{PermissionId, ResourceTypeId};

/// A catalog entry describing one permission.
///
/// # Example
///
/// ```
/// use acl_graph::ids::{PermissionId, ResourceTypeId};
/// use acl_graph::permissions::Permission;
///
/// let perm = Permission::new(PermissionId(1), "read", ResourceTypeId(10))
///     .with_description("Read the document body");
/// assert_eq!(perm.name, "read");
/// assert_eq!(perm.resource_type, ResourceTypeId(10));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    /// Unique permission id.
    pub id: PermissionId,
    /// Short name (e.g. "read").
    pub name: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// The resource type this permission is valid for.
    pub resource_type: ResourceTypeId,
}

impl Permission {
    /// Create a new catalog entry with an empty description.
    pub fn new(id: PermissionId, name: impl Into<String>, resource_type: ResourceTypeId) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            resource_type,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Registry of every permission known to the graph.
///
/// Entries are immutable once inserted; they can only be removed, which the
/// graph does together with stripping the id from every grant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionCatalog {
    entries: BTreeMap<PermissionId, Permission>,
}

impl PermissionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a permission.
    ///
    /// # Errors
    ///
    /// `DuplicateRegistration` if the id is already present.
    pub fn insert(&mut self, permission: Permission) -> AclResult<()> {
        if self.entries.contains_key(&permission.id) {
            return Err(AclError::DuplicateRegistration {
                kind: "permission",
                id: permission.id.get(),
            });
        }
        self.entries.insert(permission.id, permission);
        Ok(())
    }

    /// Remove a permission, returning it if it was present.
    pub fn remove(&mut self, id: PermissionId) -> Option<Permission> {
        self.entries.remove(&id)
    }

    /// Remove every permission belonging to a resource type.
    ///
    /// # Returns
    ///
    /// The ids that were removed
    pub fn remove_type(&mut self, resource_type: ResourceTypeId) -> Vec<PermissionId> {
        let ids: Vec<PermissionId> = self.for_type(resource_type).map(|p| p.id).collect();
        for id in &ids {
            self.entries.remove(id);
        }
        ids
    }

    /// Look up a permission by id.
    pub fn get(&self, id: PermissionId) -> Option<&Permission> {
        self.entries.get(&id)
    }

    /// Check if the catalog contains an id.
    pub fn contains(&self, id: PermissionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Iterate over the permissions of one resource type.
    pub fn for_type(&self, resource_type: ResourceTypeId) -> impl Iterator<Item = &Permission> {
        self.entries
            .values()
            .filter(move |p| p.resource_type == resource_type)
    }

    /// Find a permission of a resource type by its name.
    pub fn find_by_name(&self, resource_type: ResourceTypeId, name: &str) -> Option<&Permission> {
        self.for_type(resource_type).find(|p| p.name == name)
    }

    /// Iterate over all entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.entries.values()
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A set of permissions, keyed by id, with each permission's name.
///
/// Iteration order is ascending by id, which keeps merged results
/// deterministic.
///
/// # Example
///
/// ```
/// use acl_graph::ids::PermissionId;
/// use acl_graph::permissions::PermissionSet;
///
/// let mut set = PermissionSet::new();
/// set.add(PermissionId(1), "read");
/// set.add(PermissionId(2), "write");
///
/// assert!(set.has(PermissionId(1)));
/// assert!(set.has_named("write"));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeMap<PermissionId, String>,
}

impl PermissionSet {
    /// Create a new empty permission set.
    pub fn new() -> Self {
        Self {
            permissions: BTreeMap::new(),
        }
    }

    /// Add a permission to the set.
    pub fn add(&mut self, id: PermissionId, name: impl Into<String>) {
        self.permissions.insert(id, name.into());
    }

    /// Remove a permission from the set.
    ///
    /// # Returns
    ///
    /// `true` if the permission was present, `false` otherwise
    pub fn remove(&mut self, id: PermissionId) -> bool {
        self.permissions.remove(&id).is_some()
    }

    /// Check if the set contains a permission id.
    pub fn has(&self, id: PermissionId) -> bool {
        self.permissions.contains_key(&id)
    }

    /// Check if the set contains a permission with the given name.
    pub fn has_named(&self, name: &str) -> bool {
        self.permissions.values().any(|n| n == name)
    }

    /// Get the name of a permission in the set.
    pub fn name_of(&self, id: PermissionId) -> Option<&str> {
        self.permissions.get(&id).map(String::as_str)
    }

    /// Iterate over the permission ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = PermissionId> + '_ {
        self.permissions.keys().copied()
    }

    /// Iterate over `(id, name)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (PermissionId, &str)> {
        self.permissions.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Merge another permission set into this one (set union).
    pub fn merge(&mut self, other: &PermissionSet) {
        for (id, name) in &other.permissions {
            self.permissions.entry(*id).or_insert_with(|| name.clone());
        }
    }

    /// Keep only the permissions for which the predicate holds.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(PermissionId) -> bool,
    {
        self.permissions.retain(|id, _| keep(*id));
    }

    /// Get the count of permissions.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Check if this set contains all permissions from another set.
    pub fn contains_all(&self, other: &PermissionSet) -> bool {
        other.ids().all(|id| self.has(id))
    }

    /// Check if this set contains any permission from another set.
    pub fn contains_any(&self, other: &PermissionSet) -> bool {
        other.ids().any(|id| self.has(id))
    }
}

impl FromIterator<(PermissionId, String)> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = (PermissionId, String)>>(iter: T) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_type() -> ResourceTypeId {
        ResourceTypeId(1)
    }

    #[test]
    fn test_catalog_insert_and_lookup() {
        let mut catalog = PermissionCatalog::new();
        catalog
            .insert(Permission::new(PermissionId(1), "read", doc_type()))
            .unwrap();
        catalog
            .insert(Permission::new(PermissionId(2), "write", doc_type()))
            .unwrap();
        catalog
            .insert(Permission::new(PermissionId(3), "deploy", ResourceTypeId(2)))
            .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.for_type(doc_type()).count(), 2);
        assert_eq!(
            catalog.find_by_name(doc_type(), "write").map(|p| p.id),
            Some(PermissionId(2))
        );
        assert!(catalog.find_by_name(doc_type(), "deploy").is_none());
    }

    #[test]
    fn test_catalog_rejects_duplicate_id() {
        let mut catalog = PermissionCatalog::new();
        catalog
            .insert(Permission::new(PermissionId(1), "read", doc_type()))
            .unwrap();
        let err = catalog
            .insert(Permission::new(PermissionId(1), "other", doc_type()))
            .unwrap_err();
        assert_eq!(
            err,
            AclError::DuplicateRegistration {
                kind: "permission",
                id: 1
            }
        );
        assert_eq!(catalog.get(PermissionId(1)).unwrap().name, "read");
    }

    #[test]
    fn test_catalog_remove_type() {
        let mut catalog = PermissionCatalog::new();
        catalog
            .insert(Permission::new(PermissionId(1), "read", doc_type()))
            .unwrap();
        catalog
            .insert(Permission::new(PermissionId(2), "deploy", ResourceTypeId(2)))
            .unwrap();

        let removed = catalog.remove_type(doc_type());
        assert_eq!(removed, vec![PermissionId(1)]);
        assert!(!catalog.contains(PermissionId(1)));
        assert!(catalog.contains(PermissionId(2)));
    }

    #[test]
    fn test_permission_set() {
        let mut set = PermissionSet::new();
        set.add(PermissionId(1), "read");
        set.add(PermissionId(2), "write");

        assert!(set.has(PermissionId(1)));
        assert!(set.has_named("write"));
        assert!(!set.has(PermissionId(3)));
        assert_eq!(set.name_of(PermissionId(2)), Some("write"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_permission_set_merge_is_union() {
        let mut set1 = PermissionSet::new();
        set1.add(PermissionId(1), "read");

        let mut set2 = PermissionSet::new();
        set2.add(PermissionId(1), "read");
        set2.add(PermissionId(2), "write");

        set1.merge(&set2);
        assert_eq!(set1.len(), 2);
        assert_eq!(
            set1.ids().collect::<Vec<_>>(),
            vec![PermissionId(1), PermissionId(2)]
        );
    }

    #[test]
    fn test_permission_set_remove_and_retain() {
        let mut set: PermissionSet = vec![
            (PermissionId(1), "read".to_string()),
            (PermissionId(2), "write".to_string()),
            (PermissionId(3), "share".to_string()),
        ]
        .into_iter()
        .collect();

        assert!(set.remove(PermissionId(3)));
        assert!(!set.remove(PermissionId(3)));

        set.retain(|id| id != PermissionId(2));
        assert_eq!(set.ids().collect::<Vec<_>>(), vec![PermissionId(1)]);
    }

    #[test]
    fn test_permission_set_contains_all_and_any() {
        let mut big = PermissionSet::new();
        big.add(PermissionId(1), "read");
        big.add(PermissionId(2), "write");

        let mut small = PermissionSet::new();
        small.add(PermissionId(1), "read");

        assert!(big.contains_all(&small));
        assert!(!small.contains_all(&big));
        assert!(small.contains_any(&big));

        let mut other = PermissionSet::new();
        other.add(PermissionId(9), "admin");
        assert!(!big.contains_any(&other));
    }
}

//! Data store abstraction.
//!
//! The loader reads the seven tables through [`DataStore`]; production
//! deployments implement it over their database, tests and fixtures use
//! [`MemoryDataStore`].

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::tables::{
    GroupResourceRow, PermissionRow, ResourceRow, ResourceTypeRow, RoleMemberOfRow, RolePermissionResourceRow,
    RoleRow, Table, Tables,
};

/// Read access to the persisted authorization tables.
///
/// Each method returns the whole table. Implementations report an
/// unreadable table as [`StoreError::TableUnavailable`].
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Read the `permission` table.
    async fn permissions(&self) -> StoreResult<Vec<PermissionRow>>;

    /// Read the `resource_type` table.
    async fn resource_types(&self) -> StoreResult<Vec<ResourceTypeRow>>;

    /// Read the `resource` table.
    async fn resources(&self) -> StoreResult<Vec<ResourceRow>>;

    /// Read the `role` table.
    async fn roles(&self) -> StoreResult<Vec<RoleRow>>;

    /// Read the `role_memberof` table.
    async fn role_memberships(&self) -> StoreResult<Vec<RoleMemberOfRow>>;

    /// Read the `role_permission_resource` table.
    async fn role_permissions(&self) -> StoreResult<Vec<RolePermissionResourceRow>>;

    /// Read the `group_resource` table.
    async fn group_resources(&self) -> StoreResult<Vec<GroupResourceRow>>;

    /// Read every table, in load order.
    ///
    /// Stops at the first unreadable table.
    async fn read_all(&self) -> StoreResult<Tables> {
        Ok(Tables {
            permission: self.permissions().await?,
            resource_type: self.resource_types().await?,
            resource: self.resources().await?,
            role: self.roles().await?,
            role_memberof: self.role_memberships().await?,
            role_permission_resource: self.role_permissions().await?,
            group_resource: self.group_resources().await?,
        })
    }
}

/// In-memory data store.
///
/// Holds a full set of rows; tables listed as unavailable fail on read,
/// which lets callers exercise bootstrap failure handling.
#[derive(Debug, Default)]
pub struct MemoryDataStore {
    tables: RwLock<Tables>,
    unavailable: RwLock<Vec<Table>>,
}

impl MemoryDataStore {
    /// Create a store holding `tables`.
    pub fn new(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
            unavailable: RwLock::new(Vec::new()),
        }
    }

    /// Create a store from a JSON document keyed by table name.
    ///
    /// # Example
    ///
    /// ```
    /// use acl_store::MemoryDataStore;
    ///
    /// let store = MemoryDataStore::from_json(r#"{"role": [{"id": 1, "name": "viewer"}]}"#).unwrap();
    /// ```
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let tables: Tables = serde_json::from_str(json)?;
        Ok(Self::new(tables))
    }

    /// Copy of the current rows.
    pub async fn tables(&self) -> Tables {
        self.tables.read().await.clone()
    }

    /// Modify the stored rows in place.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Tables),
    {
        let mut tables = self.tables.write().await;
        f(&mut tables);
    }

    /// Make reads of `table` fail until [`MemoryDataStore::restore`] is called.
    pub async fn make_unavailable(&self, table: Table) {
        let mut unavailable = self.unavailable.write().await;
        if !unavailable.contains(&table) {
            unavailable.push(table);
        }
    }

    /// Make every table readable again.
    pub async fn restore(&self) {
        self.unavailable.write().await.clear();
    }

    async fn check(&self, table: Table) -> StoreResult<()> {
        if self.unavailable.read().await.contains(&table) {
            return Err(StoreError::TableUnavailable {
                table: table.as_str(),
                reason: "marked unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn permissions(&self) -> StoreResult<Vec<PermissionRow>> {
        self.check(Table::Permission).await?;
        Ok(self.tables.read().await.permission.clone())
    }

    async fn resource_types(&self) -> StoreResult<Vec<ResourceTypeRow>> {
        self.check(Table::ResourceType).await?;
        Ok(self.tables.read().await.resource_type.clone())
    }

    async fn resources(&self) -> StoreResult<Vec<ResourceRow>> {
        self.check(Table::Resource).await?;
        Ok(self.tables.read().await.resource.clone())
    }

    async fn roles(&self) -> StoreResult<Vec<RoleRow>> {
        self.check(Table::Role).await?;
        Ok(self.tables.read().await.role.clone())
    }

    async fn role_memberships(&self) -> StoreResult<Vec<RoleMemberOfRow>> {
        self.check(Table::RoleMemberOf).await?;
        Ok(self.tables.read().await.role_memberof.clone())
    }

    async fn role_permissions(&self) -> StoreResult<Vec<RolePermissionResourceRow>> {
        self.check(Table::RolePermissionResource).await?;
        Ok(self.tables.read().await.role_permission_resource.clone())
    }

    async fn group_resources(&self) -> StoreResult<Vec<GroupResourceRow>> {
        self.check(Table::GroupResource).await?;
        Ok(self.tables.read().await.group_resource.clone())
    }
}

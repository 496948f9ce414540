//! # Access-Control Graph
//!
//! This crate is the in-memory authorization core: it answers "does role R
//! have permission P on resource X" against a materialized graph of roles,
//! resources and permission vocabularies.
//!
//! ## Overview
//!
//! The acl-graph crate handles:
//! - **Permission catalog**: Every permission and the resource type it belongs to
//! - **Resource types**: Named permission vocabularies
//! - **Resources and groups**: Protected entities, optionally grouped
//! - **Grants**: A subset of a type's permissions bound to one resource
//! - **Roles**: Nodes of an inheritance DAG owning grants and parent links
//! - **Authorization graph**: The registry, mutation API and queries
//!
//! ## Architecture
//!
//! ```text
//! PermissionCatalog ─→ ResourceType ─→ Resource / group
//!                                           │
//! Role ──parents──→ Role          ResPermsPair (role-owned grant)
//!   └──────── resources ─────────────→ ┘
//! ```
//!
//! ## Resolution Rules
//!
//! - A role sees its own grants plus those of every ancestor
//! - Grants on a group reach every member, including members of nested groups
//! - Overlapping grants are merged by union; no ancestor can take a permission away
//! - A direct grant is replaced, not extended, when granted again
//!
//! ## Usage
//!
//! ```rust
//! use acl_graph::ids::{PermissionId, ResourceId, ResourceTypeId, RoleId};
//! use acl_graph::{AuthorizationGraph, Permission, Resource, ResourceType, Role};
//!
//! let mut graph = AuthorizationGraph::new();
//! graph.add_resource_type(ResourceType::new(ResourceTypeId(1), "document")).unwrap();
//! graph.add_permission(Permission::new(PermissionId(1), "read", ResourceTypeId(1))).unwrap();
//! graph.register_resource(Resource::group(ResourceId(1), "handbook", ResourceTypeId(1))).unwrap();
//! graph.register_resource(Resource::new(ResourceId(2), "chapter-1", ResourceTypeId(1))).unwrap();
//! graph.add_member(ResourceId(1), ResourceId(2)).unwrap();
//!
//! graph.register_role(Role::new(RoleId(1), "staff")).unwrap();
//! graph.register_role(Role::new(RoleId(2), "intern")).unwrap();
//! graph.add_parent(RoleId(2), RoleId(1)).unwrap();
//! graph.grant(RoleId(1), ResourceId(1), [PermissionId(1)]).unwrap();
//!
//! assert!(graph.has_permission(RoleId(2), ResourceId(2), PermissionId(1)).unwrap());
//! ```
//!
//! ## Concurrency
//!
//! [`SharedGraph`] wraps the graph in a reader/writer lock: queries run in
//! parallel, mutations are exclusive, and
//! [`SharedGraph::transaction`] applies multi-step changes all-or-nothing.

pub mod error;
pub mod grants;
pub mod graph;
pub mod ids;
pub mod permissions;
pub mod resources;
pub mod roles;
pub mod shared;

// Re-export main types for convenience
pub use error::{AclError, AclResult};
pub use grants::ResPermsPair;
pub use graph::{AuthorizationGraph, GraphStats};
pub use ids::{PermissionId, ResourceId, ResourceTypeId, RoleId};
pub use permissions::{Permission, PermissionCatalog, PermissionSet};
pub use resources::{Resource, ResourceKind, ResourceType};
pub use roles::{Ancestors, Role, RoleRef};
pub use shared::SharedGraph;

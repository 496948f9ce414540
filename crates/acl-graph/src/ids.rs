//! # Identifiers
//!
//! Strongly-typed ids for every namespace in the graph. Roles, resources,
//! resource types and permissions each have their own id space, so the
//! newtypes keep a role id from being passed where a resource id is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the raw integer value.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a role.
    RoleId
);
define_id!(
    /// Identifier of a resource or resource group.
    ResourceId
);
define_id!(
    /// Identifier of a resource type.
    ResourceTypeId
);
define_id!(
    /// Identifier of a permission in the catalog.
    PermissionId
);

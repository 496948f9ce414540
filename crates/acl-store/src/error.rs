//! Error types for the store collaborators
//!
//! Bootstrap failures are fatal to the load that raised them: the loader
//! never hands out a partially built graph.

use acl_graph::AclError;
use thiserror::Error;

use crate::config::ConfigError;

/// Store, loader and cache error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required table could not be read (or was empty in strict mode)
    #[error("Table {table} unavailable: {reason}")]
    TableUnavailable {
        /// Logical table name.
        table: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// A row was rejected by the graph while building it
    #[error("Invalid data in table {table}: {source}")]
    Graph {
        /// Logical table the row came from.
        table: &'static str,
        /// The graph's rejection.
        #[source]
        source: AclError,
    },

    /// A graph operation failed outside of a bootstrap
    #[error(transparent)]
    Acl(#[from] AclError),

    /// Lookup cache failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Wrap a graph error raised while applying rows from `table`.
    pub fn in_table(table: &'static str) -> impl FnOnce(AclError) -> StoreError {
        move |source| StoreError::Graph { table, source }
    }

    /// Check if this error aborted a bootstrap.
    pub fn is_bootstrap_failure(&self) -> bool {
        matches!(
            self,
            StoreError::TableUnavailable { .. } | StoreError::Graph { .. }
        )
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

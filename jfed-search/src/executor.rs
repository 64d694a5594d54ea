//! Query execution seam
//!
//! The federation core never opens a store itself. It hands a store id, a
//! query text and positional parameters to a [`QueryExecutor`] and gets raw
//! rows back. The SQLite implementation lives in [`crate::db`].

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// One raw row: column name -> scalar JSON value
pub type RawRow = Map<String, Value>;

/// Positional query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Real(f64),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        SqlParam::Real(value)
    }
}

/// Failure of a single backing store
///
/// Always recovered by the federation engine: the store is excluded from
/// the merge and the request continues.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// Store could not be opened or reached
    #[error("Failed to connect to store {store}: {message}")]
    Connection { store: String, message: String },

    /// Store rejected or failed the query
    #[error("Query error in {store}: {message}")]
    Query { store: String, message: String },

    /// Store did not answer within the per-store timeout
    #[error("Store {store} timed out after {after_ms} ms")]
    Timeout { store: String, after_ms: u64 },

    /// Executor has no handle for this store id
    #[error("Unknown store: {0}")]
    UnknownStore(String),
}

/// Capability to run one parameterized read query against one store
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn run(
        &self,
        store: &str,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<RawRow>, StoreError>;
}

//! SQLite store access
//!
//! One read-only pool per backing store, keyed by store id. A store whose
//! file is missing at startup stays registered without a pool, so every
//! query against it fails with a connection error instead of aborting the
//! service.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool, ValueRef};
use tracing::{debug, info, warn};

use crate::executor::{QueryExecutor, RawRow, SqlParam, StoreError};
use crate::stores::STORES;

/// Connections per store pool
const POOL_SIZE: u32 = 4;

/// Open `db_path` read-only
///
/// Fails when the file does not exist; SQLite is never allowed to create it.
/// Bridge batches for one store share its pool, so a query may wait for a
/// connection for up to `acquire_timeout`; callers pass the per-store query
/// budget so queued batches are bounded by the same deadline.
pub async fn connect_readonly(db_path: &Path, acquire_timeout: Duration) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .create_if_missing(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(POOL_SIZE)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await
        .with_context(|| {
            format!("Failed to open {} in read-only mode", db_path.display())
        })?;

    Ok(pool)
}

/// [`QueryExecutor`] over one SQLite pool per store
#[derive(Clone, Default)]
pub struct SqliteExecutor {
    pools: HashMap<String, Option<SqlitePool>>,
}

impl SqliteExecutor {
    /// Executor over already-open pools; stores not listed are unknown
    pub fn from_pools<I, S>(pools: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlitePool)>,
        S: Into<String>,
    {
        Self {
            pools: pools
                .into_iter()
                .map(|(name, pool)| (name.into(), Some(pool)))
                .collect(),
        }
    }

    /// Open every catalog store found in `data_dir`
    ///
    /// Missing or unreadable files are logged; the store stays known but
    /// unavailable.
    pub async fn open_dir(data_dir: &Path, store_timeout: Duration) -> Self {
        let mut pools = HashMap::with_capacity(STORES.len());
        let mut available = 0usize;

        for store in STORES {
            let path = data_dir.join(store.name);
            match connect_readonly(&path, store_timeout).await {
                Ok(pool) => {
                    debug!(store = store.name, path = %path.display(), "Opened store");
                    available += 1;
                    pools.insert(store.name.to_string(), Some(pool));
                }
                Err(e) => {
                    warn!(store = store.name, error = %e, "Store unavailable");
                    pools.insert(store.name.to_string(), None);
                }
            }
        }

        info!(
            "Opened {}/{} stores (read-only) from {}",
            available,
            STORES.len(),
            data_dir.display()
        );

        Self { pools }
    }

    /// Store ids with an open pool
    pub fn available_stores(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .pools
            .iter()
            .filter(|(_, pool)| pool.is_some())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    fn pool(&self, store: &str) -> Result<&SqlitePool, StoreError> {
        match self.pools.get(store) {
            Some(Some(pool)) => Ok(pool),
            Some(None) => Err(StoreError::Connection {
                store: store.to_string(),
                message: "store file is not available".to_string(),
            }),
            None => Err(StoreError::UnknownStore(store.to_string())),
        }
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    async fn run(
        &self,
        store: &str,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<RawRow>, StoreError> {
        let pool = self.pool(store)?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                SqlParam::Text(text) => query.bind(text.clone()),
                SqlParam::Real(value) => query.bind(*value),
            };
        }

        let rows = query.fetch_all(pool).await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Connection {
                    store: store.to_string(),
                    message: e.to_string(),
                }
            }
            other => StoreError::Query {
                store: store.to_string(),
                message: other.to_string(),
            },
        })?;

        Ok(rows.iter().map(row_to_json).collect())
    }
}

/// Convert one SQLite row to a column-name keyed JSON object
fn row_to_json(row: &SqliteRow) -> RawRow {
    let mut object = RawRow::new();
    for (i, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), column_value(row, i));
    }
    object
}

fn column_value(row: &SqliteRow, i: usize) -> Value {
    match row.try_get_raw(i) {
        Ok(raw) if raw.is_null() => Value::Null,
        Ok(_) => row
            .try_get::<String, _>(i)
            .ok()
            .map(Value::String)
            .or_else(|| row.try_get::<i64, _>(i).ok().map(|v| json!(v)))
            .or_else(|| row.try_get::<f64, _>(i).ok().map(|v| json!(v)))
            .unwrap_or(Value::Null),
        Err(_) => Value::Null,
    }
}

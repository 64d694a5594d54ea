//! Shared fixtures: one in-memory SQLite database per catalog store, created
//! with the column layout each store really has.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use jfed_search::db::SqliteExecutor;
use jfed_search::federation::FederationEngine;
use jfed_search::stores::STORES;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

const PUBLISHER_COLUMNS: &str =
    "title TEXT, issn TEXT, cite_score TEXT, impact_factor TEXT, aims_and_scope TEXT, indexed TEXT, link TEXT";

/// CREATE TABLE statement for a store's journal table
pub fn schema(store: &str) -> String {
    match store {
        "sage.db" => format!("CREATE TABLE journal_data ({})", PUBLISHER_COLUMNS),
        "elsevier_journals.db" | "emerald_journals.db" | "tandf_journal_details.db" => {
            format!("CREATE TABLE journal_details ({})", PUBLISHER_COLUMNS)
        }
        "wiley_db.db" => format!("CREATE TABLE journals ({})", PUBLISHER_COLUMNS),
        "world_scientific_journals.db" => format!("CREATE TABLE \"Journals\" ({})", PUBLISHER_COLUMNS),
        "inderscience_journals.db" => "CREATE TABLE journal_details (title TEXT, print_issn TEXT, \
             cite_score TEXT, impact_factor TEXT, aims_and_scope TEXT, indexed TEXT, link TEXT)"
            .to_string(),
        "springer_journals.db" => "CREATE TABLE journals (title TEXT, print_issn TEXT, \
             electronic_issn TEXT, cite_score TEXT, impact_factor TEXT, aims_and_scope TEXT, \
             indexed TEXT, link TEXT)"
            .to_string(),
        "annex.db" => "CREATE TABLE journals (title TEXT, issn TEXT, publisher TEXT, \
             cite_score TEXT, impact_factor TEXT, aims_and_scope TEXT, indexed TEXT, link TEXT, \
             subject_area TEXT)"
            .to_string(),
        "ugc.db" => "CREATE TABLE journals (journal_title TEXT, issn TEXT, publisher TEXT, \
             \"CiteScore\" TEXT, \"SubjectArea\" TEXT, keywords TEXT, indexed TEXT)"
            .to_string(),
        "journal_details.db" => "CREATE TABLE journal_details (title TEXT, issn TEXT, \
             publisher TEXT, cite_score TEXT, impact_factor TEXT, aims_and_scope TEXT, link TEXT)"
            .to_string(),
        other => panic!("no fixture schema for {}", other),
    }
}

/// Single-connection in-memory database that lives as long as the pool
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database")
}

/// Every catalog store, schema created, no rows
pub struct Stores {
    pub pools: HashMap<&'static str, SqlitePool>,
}

impl Stores {
    pub async fn new() -> Self {
        Self::only(&STORES.iter().map(|s| s.name).collect::<Vec<_>>()).await
    }

    /// Only the named stores exist; the rest are unknown to the executor
    pub async fn only(names: &[&'static str]) -> Self {
        let mut pools = HashMap::new();
        for name in names {
            let pool = memory_pool().await;
            sqlx::query(&schema(name))
                .execute(&pool)
                .await
                .expect("Should create fixture table");
            pools.insert(*name, pool);
        }
        Self { pools }
    }

    /// Run a statement (usually an INSERT) against one store
    pub async fn exec(&self, store: &str, sql: &str) {
        let pool = self.pools.get(store).expect("Store not in fixture");
        sqlx::query(sql)
            .execute(pool)
            .await
            .unwrap_or_else(|e| panic!("fixture statement failed on {}: {}", store, e));
    }

    pub fn executor(&self) -> SqliteExecutor {
        SqliteExecutor::from_pools(self.pools.iter().map(|(name, pool)| (*name, pool.clone())))
    }

    pub fn engine(&self) -> FederationEngine {
        FederationEngine::new(Arc::new(self.executor()), Duration::from_secs(5))
    }
}

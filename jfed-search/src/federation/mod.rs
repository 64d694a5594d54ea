//! Federation engine
//!
//! Orchestrates one search across the backing stores:
//!
//! ```text
//! Filter ──▶ router ──▶ Direct(stores) ──▶ fan-out ─┐
//!                  └──▶ Annexure ──▶ ISSN bridge ───┤
//!                                                   ▼
//!             (zero results + title search) ──▶ fallback cascade
//!                                                   ▼
//!                                               reconcile
//! ```
//!
//! Every store query is an independent task bounded by the store timeout.
//! Tasks return their rows instead of writing shared state, and results are
//! merged in task-creation order, never completion order, so output is
//! reproducible. A failing store is logged and excluded; it never fails the
//! request.

mod annexure;
mod fallback;

pub use annexure::{IssnBridge, ISSN_BATCH_SIZE};

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use jfed_common::types::SearchResponse;
use jfed_common::{CanonicalRecord, Filter, Sorting};
use tracing::{debug, info, warn};

use crate::error::SearchError;
use crate::executor::{QueryExecutor, StoreError};
use crate::normalize::normalize;
use crate::predicate::{self, Predicate};
use crate::reconcile::reconcile;
use crate::router::{self, Route};
use crate::stores::StoreDescriptor;

/// Final result of one federated search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub records: Vec<CanonicalRecord>,
    /// Every store a query was issued to, in issue order
    pub queried_stores: Vec<String>,
    pub is_annexure: bool,
    pub used_fallback: bool,
    /// Explanation attached to an empty result the router could not avoid
    pub message: Option<String>,
}

impl SearchOutcome {
    pub fn total_results(&self) -> usize {
        self.records.len()
    }

    pub fn into_response(self) -> SearchResponse {
        SearchResponse {
            success: true,
            total_results: self.records.len(),
            data: self.records,
            queried_stores: self.queried_stores,
            is_annexure: self.is_annexure,
            used_fallback: self.used_fallback,
            message: self.message,
        }
    }
}

/// One query against one store
#[derive(Debug, Clone)]
pub(crate) struct StoreQuery {
    pub store: &'static StoreDescriptor,
    pub predicate: Predicate,
}

/// Stores a request touched, without repeats
#[derive(Debug, Default)]
pub(crate) struct QueriedStores(Vec<&'static str>);

impl QueriedStores {
    fn record(&mut self, store: &'static str) {
        if !self.0.contains(&store) {
            self.0.push(store);
        }
    }

    fn into_names(self) -> Vec<String> {
        self.0.into_iter().map(str::to_string).collect()
    }
}

/// Fan-out/fan-in search engine over a [`QueryExecutor`]
pub struct FederationEngine {
    executor: Arc<dyn QueryExecutor>,
    store_timeout: Duration,
}

impl FederationEngine {
    pub fn new(executor: Arc<dyn QueryExecutor>, store_timeout: Duration) -> Self {
        Self {
            executor,
            store_timeout,
        }
    }

    /// Run a complete search: route, federate, fall back, reconcile
    pub async fn search(
        &self,
        filter: &Filter,
        sorting: Option<&Sorting>,
    ) -> Result<SearchOutcome, SearchError> {
        filter.validate()?;

        let route = router::resolve_targets(filter);
        let mut queried = QueriedStores::default();
        let mut message = None;

        info!(
            annexure = route.is_annexure(),
            targets = route.stores().len(),
            "Resolved search targets"
        );

        let (primary, is_annexure) = match &route {
            Route::Annexure(annex) => {
                let targets = router::bridge_targets(filter);
                if targets.is_empty() {
                    message = Some("No backing store matches the requested publishers".to_string());
                }
                let records = self.annexure_search(*annex, &targets, filter, &mut queried).await;
                (records, true)
            }
            Route::Direct(stores) => {
                if stores.is_empty() {
                    message = Some("No backing store matches the requested publishers".to_string());
                }
                (self.direct(filter, stores, &mut queried).await, false)
            }
        };

        let mut used_fallback = false;
        let records = if primary.is_empty() && !is_annexure {
            if filter.searches_title() {
                info!("No results from primary stores; running title fallback");
                used_fallback = true;
                self.fallback(filter, &mut queried).await
            } else {
                debug!("No results; fallback skipped because title is not searched");
                primary
            }
        } else {
            primary
        };

        if !records.is_empty() {
            message = None;
        }

        let records = reconcile(records, filter, sorting);

        info!(
            results = records.len(),
            annexure = is_annexure,
            fallback = used_fallback,
            "Search complete"
        );

        Ok(SearchOutcome {
            records,
            queried_stores: queried.into_names(),
            is_annexure,
            used_fallback,
            message,
        })
    }

    /// Direct federation: one predicate per store, all run concurrently
    async fn direct(
        &self,
        filter: &Filter,
        stores: &[&'static StoreDescriptor],
        queried: &mut QueriedStores,
    ) -> Vec<CanonicalRecord> {
        let queries: Vec<StoreQuery> = stores
            .iter()
            .map(|&store| StoreQuery {
                store,
                predicate: predicate::build(filter, store.name),
            })
            .collect();

        for q in &queries {
            queried.record(q.store.name);
        }

        self.fan_out(queries).await
    }

    /// Run `queries` concurrently and merge successes in query order
    pub(crate) async fn fan_out(&self, queries: Vec<StoreQuery>) -> Vec<CanonicalRecord> {
        let tasks = queries.iter().map(|query| self.run_query(query));
        let results = join_all(tasks).await;

        let mut merged = Vec::new();
        for (query, result) in queries.iter().zip(results) {
            match result {
                Ok(records) => {
                    debug!(store = query.store.name, rows = records.len(), "Store query complete");
                    merged.extend(records);
                }
                Err(e) => {
                    warn!(
                        store = query.store.name,
                        error = %e,
                        "Store query failed; excluding store from results"
                    );
                }
            }
        }
        merged
    }

    /// Run one store query under the store timeout and normalize its rows
    pub(crate) async fn run_query(
        &self,
        query: &StoreQuery,
    ) -> Result<Vec<CanonicalRecord>, StoreError> {
        let store = query.store;
        let sql = query.predicate.select_sql(store.table);
        debug!(store = store.name, sql = %sql, params = query.predicate.params.len(), "Querying store");

        let rows = tokio::time::timeout(
            self.store_timeout,
            self.executor.run(store.name, &sql, &query.predicate.params),
        )
        .await
        .map_err(|_| StoreError::Timeout {
            store: store.name.to_string(),
            after_ms: self.store_timeout.as_millis() as u64,
        })??;

        Ok(normalize(store.name, &rows))
    }
}

#[cfg(test)]
mod tests;

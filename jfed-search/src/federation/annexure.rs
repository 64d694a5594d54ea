//! Annexure cross-reference
//!
//! Two stages joined by an [`IssnBridge`]:
//! 1. read the annexure store with the request's predicate and collect the
//!    distinct ISSNs of its rows
//! 2. look those ISSNs up in the bridge target stores, one query per
//!    (store, batch) pair, all concurrently

use std::collections::HashSet;

use jfed_common::{CanonicalRecord, Filter};
use tracing::{debug, info, warn};

use super::{FederationEngine, QueriedStores, StoreQuery};
use crate::predicate;
use crate::stores::StoreDescriptor;

/// Maximum ISSNs per bridge query
pub const ISSN_BATCH_SIZE: usize = 50;

/// Distinct ISSNs read from the annexure store, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssnBridge {
    issns: Vec<String>,
}

impl IssnBridge {
    /// Collect ISSNs from `records`; `None` when no record carries one
    pub fn from_records(records: &[CanonicalRecord]) -> Option<IssnBridge> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut issns: Vec<String> = Vec::new();
        for record in records {
            let issn = record.issn.trim();
            if !issn.is_empty() && seen.insert(issn) {
                issns.push(issn.to_string());
            }
        }
        (!issns.is_empty()).then_some(IssnBridge { issns })
    }

    pub fn issns(&self) -> &[String] {
        &self.issns
    }

    pub fn len(&self) -> usize {
        self.issns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issns.is_empty()
    }

    /// ISSNs split into consecutive batches of at most `size`
    pub fn batches(&self, size: usize) -> impl Iterator<Item = &[String]> {
        self.issns.chunks(size.max(1))
    }
}

impl FederationEngine {
    /// Full annexure path: stage 1 then stage 2
    pub(super) async fn annexure_search(
        &self,
        annex: &'static StoreDescriptor,
        targets: &[&'static StoreDescriptor],
        filter: &Filter,
        queried: &mut QueriedStores,
    ) -> Vec<CanonicalRecord> {
        let Some(bridge) = self.read_issns(annex, filter, queried).await else {
            info!("Annexure store produced no ISSNs; nothing to bridge");
            return Vec::new();
        };
        self.bridge(&bridge, targets, queried).await
    }

    /// Stage 1: query the annexure store alone and collect its ISSNs
    pub(super) async fn read_issns(
        &self,
        annex: &'static StoreDescriptor,
        filter: &Filter,
        queried: &mut QueriedStores,
    ) -> Option<IssnBridge> {
        let query = StoreQuery {
            store: annex,
            predicate: predicate::build(filter, annex.name),
        };
        queried.record(annex.name);

        let records = match self.run_query(&query).await {
            Ok(records) => records,
            Err(e) => {
                warn!(store = annex.name, error = %e, "Annexure read failed");
                return None;
            }
        };

        let bridge = IssnBridge::from_records(&records)?;
        debug!(rows = records.len(), issns = bridge.len(), "Collected annexure ISSNs");
        Some(bridge)
    }

    /// Stage 2: look the bridged ISSNs up in every target store
    pub(super) async fn bridge(
        &self,
        bridge: &IssnBridge,
        targets: &[&'static StoreDescriptor],
        queried: &mut QueriedStores,
    ) -> Vec<CanonicalRecord> {
        let mut queries = Vec::new();
        for &store in targets {
            for batch in bridge.batches(ISSN_BATCH_SIZE) {
                if let Some(predicate) = predicate::issn_batch(store.name, batch) {
                    queries.push(StoreQuery { store, predicate });
                }
            }
        }

        for q in &queries {
            queried.record(q.store.name);
        }

        info!(
            issns = bridge.len(),
            stores = targets.len(),
            queries = queries.len(),
            "Bridging annexure ISSNs"
        );

        self.fan_out(queries).await
    }
}

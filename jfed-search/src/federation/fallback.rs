//! Title fallback cascade
//!
//! Runs only after a direct federation came back empty for a title search.
//! Fallback stores ignore publisher and scheme scoping, so the filter is
//! stripped of store selection before predicates are built. Stores are
//! queried one after another.

use jfed_common::{CanonicalRecord, Filter};
use tracing::{debug, warn};

use super::{FederationEngine, QueriedStores, StoreQuery};
use crate::predicate;
use crate::router;

impl FederationEngine {
    pub(super) async fn fallback(
        &self,
        filter: &Filter,
        queried: &mut QueriedStores,
    ) -> Vec<CanonicalRecord> {
        let targets = router::resolve_fallback_targets(filter);
        let stripped = filter.without_store_selection();

        let mut records = Vec::new();
        for store in targets {
            let query = StoreQuery {
                store,
                predicate: predicate::build(&stripped, store.name),
            };
            queried.record(store.name);

            match self.run_query(&query).await {
                Ok(found) => {
                    debug!(store = store.name, rows = found.len(), "Fallback store answered");
                    records.extend(found);
                }
                Err(e) => {
                    warn!(store = store.name, error = %e, "Fallback store failed; skipping");
                }
            }
        }
        records
    }
}

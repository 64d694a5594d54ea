//! Store routing
//!
//! Resolves which stores a request is sent to. Rules are evaluated in order
//! and the first match wins:
//! 1. `databases` contains the Annexure tag: the annexure store alone
//! 2. `publishers` non-empty: each known publisher's dedicated store
//! 3. otherwise: every publisher store (annexure and fallback-only stores
//!    are never mixed into direct federation)

use jfed_common::types::ANNEXURE_TAG;
use jfed_common::Filter;

use crate::stores::{self, StoreDescriptor, StoreRole, ANNEXURE_STORE};

/// Routing decision for the primary phase of a search
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Query the annexure store, then bridge its ISSNs into other stores
    Annexure(&'static StoreDescriptor),
    /// Query these stores directly, concurrently
    Direct(Vec<&'static StoreDescriptor>),
}

impl Route {
    /// Stores the primary phase starts from
    pub fn stores(&self) -> Vec<&'static StoreDescriptor> {
        match self {
            Route::Annexure(store) => vec![*store],
            Route::Direct(stores) => stores.clone(),
        }
    }

    pub fn is_annexure(&self) -> bool {
        matches!(self, Route::Annexure(_))
    }
}

/// Resolve the primary targets for `filter`
pub fn resolve_targets(filter: &Filter) -> Route {
    if filter.has_database(ANNEXURE_TAG) {
        if let Some(annex) = stores::store(ANNEXURE_STORE) {
            return Route::Annexure(annex);
        }
    }

    if !filter.publishers.is_empty() {
        return Route::Direct(publisher_stores(&filter.publishers));
    }

    Route::Direct(stores::stores_with_role(StoreRole::Publisher).collect())
}

/// Dedicated stores for `publishers`, in request order, unknown names dropped
pub fn publisher_stores(publishers: &[String]) -> Vec<&'static StoreDescriptor> {
    let mut targets: Vec<&'static StoreDescriptor> = Vec::new();
    for name in publishers {
        if let Some(store) = stores::store_for_publisher(name) {
            if !targets.iter().any(|t| t.name == store.name) {
                targets.push(store);
            }
        }
    }
    targets
}

/// Stores the annexure ISSN bridge searches
///
/// The requested publishers' stores when publishers are given, otherwise
/// every bridge-eligible store.
pub fn bridge_targets(filter: &Filter) -> Vec<&'static StoreDescriptor> {
    if !filter.publishers.is_empty() {
        return publisher_stores(&filter.publishers);
    }
    stores::STORES.iter().filter(|s| s.bridge_target).collect()
}

/// Fallback-only stores for the title cascade
///
/// When `databases` names the scheme of specific fallback stores, exactly
/// those are returned; otherwise all fallback stores.
pub fn resolve_fallback_targets(filter: &Filter) -> Vec<&'static StoreDescriptor> {
    let fallback: Vec<&'static StoreDescriptor> =
        stores::stores_with_role(StoreRole::FallbackOnly).collect();

    let hinted: Vec<&'static StoreDescriptor> = fallback
        .iter()
        .copied()
        .filter(|s| s.scheme_tag.is_some_and(|tag| filter.has_database(tag)))
        .collect();

    if hinted.is_empty() {
        fallback
    } else {
        hinted
    }
}

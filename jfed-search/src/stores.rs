//! Backing store catalog
//!
//! Static description of every store the service federates over. The slice
//! order is the fixed iteration order used everywhere results are merged,
//! which keeps output ordering reproducible across runs.

use crate::registry::{self, LogicalField};

/// Role a store plays in federation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRole {
    /// One publisher's own catalog, queried directly
    Publisher,
    /// Aggregator whose ISSNs bridge into the publisher stores
    Annexure,
    /// Lower-confidence registry, queried only by the title fallback cascade
    FallbackOnly,
}

/// Identity of one backing store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreDescriptor {
    /// Store id; also the SQLite file name under the data directory
    pub name: &'static str,
    /// Table holding the journal rows
    pub table: &'static str,
    pub role: StoreRole,
    /// Publisher name clients select this store by
    pub publisher: Option<&'static str>,
    /// Indexing-scheme tag that singles this store out in the fallback cascade
    pub scheme_tag: Option<&'static str>,
    /// Whether the annexure ISSN bridge may target this store
    pub bridge_target: bool,
}

impl StoreDescriptor {
    const fn publisher(name: &'static str, table: &'static str, publisher: &'static str) -> Self {
        Self {
            name,
            table,
            role: StoreRole::Publisher,
            publisher: Some(publisher),
            scheme_tag: None,
            bridge_target: true,
        }
    }

    /// Logical fields this store supports, derived from the field registry
    pub fn supported_fields(&self) -> Vec<LogicalField> {
        registry::supported_fields(self.name)
    }
}

pub const ANNEXURE_STORE: &str = "annex.db";
pub const UGC_STORE: &str = "ugc.db";
pub const SCOPUS_STORE: &str = "journal_details.db";

pub static STORES: &[StoreDescriptor] = &[
    StoreDescriptor::publisher("sage.db", "journal_data", "Sage"),
    StoreDescriptor::publisher("elsevier_journals.db", "journal_details", "Elsevier"),
    StoreDescriptor::publisher("emerald_journals.db", "journal_details", "Emerald"),
    StoreDescriptor::publisher("inderscience_journals.db", "journal_details", "Inderscience"),
    StoreDescriptor::publisher("tandf_journal_details.db", "journal_details", "Taylor & Francis"),
    StoreDescriptor::publisher("wiley_db.db", "journals", "Wiley"),
    StoreDescriptor::publisher("world_scientific_journals.db", "Journals", "World Scientific"),
    StoreDescriptor::publisher("springer_journals.db", "journals", "Springer"),
    StoreDescriptor {
        name: ANNEXURE_STORE,
        table: "journals",
        role: StoreRole::Annexure,
        publisher: None,
        scheme_tag: None,
        bridge_target: false,
    },
    StoreDescriptor {
        name: UGC_STORE,
        table: "journals",
        role: StoreRole::FallbackOnly,
        publisher: None,
        scheme_tag: Some("UGC"),
        bridge_target: false,
    },
    StoreDescriptor {
        name: SCOPUS_STORE,
        table: "journal_details",
        role: StoreRole::FallbackOnly,
        publisher: None,
        scheme_tag: Some("Scopus"),
        bridge_target: true,
    },
];

/// Look up a store by id
pub fn store(name: &str) -> Option<&'static StoreDescriptor> {
    STORES.iter().find(|s| s.name == name)
}

/// Stores with the given role, in catalog order
pub fn stores_with_role(role: StoreRole) -> impl Iterator<Item = &'static StoreDescriptor> {
    STORES.iter().filter(move |s| s.role == role)
}

/// Dedicated store for a publisher name (case-insensitive)
pub fn store_for_publisher(publisher: &str) -> Option<&'static StoreDescriptor> {
    let wanted = publisher.trim();
    STORES.iter().find(|s| {
        s.publisher
            .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
    })
}

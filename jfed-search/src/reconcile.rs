//! Result reconciliation
//!
//! Sequential passes over the merged record sequence:
//! 1. Dedup on the structured `(issn, publisher)` key, first seen wins
//! 2. Quartile filter (only when quartiles are requested)
//! 3. Sort (only when a sort field is given)

use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::Range;

use icu_collator::{Collator, CollatorOptions, Strength};
use jfed_common::{CanonicalRecord, Filter, Quartile, SortOrder, Sorting};
use tracing::{debug, warn};

/// Run all reconciliation passes
pub fn reconcile(
    records: Vec<CanonicalRecord>,
    filter: &Filter,
    sorting: Option<&Sorting>,
) -> Vec<CanonicalRecord> {
    let mut records = dedup(records);

    let quartiles = filter.requested_quartiles();
    if !quartiles.is_empty() {
        records = quartile_filter(&records, &quartiles);
    }

    if let Some(sorting) = sorting {
        sort_records(&mut records, sorting);
    }

    records
}

/// Drop every record whose `(issn, publisher)` was already seen
pub fn dedup(records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::with_capacity(records.len());
    let total = records.len();

    let unique: Vec<CanonicalRecord> = records
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert((record.issn.clone(), record.publisher.clone()));
            if !fresh {
                debug!(
                    issn = %record.issn,
                    publisher = record.publisher.as_deref().unwrap_or(""),
                    title = %record.title,
                    "Dropping duplicate journal entry"
                );
            }
            fresh
        })
        .collect();

    if unique.len() < total {
        debug!(dropped = total - unique.len(), kept = unique.len(), "Deduplicated results");
    }
    unique
}

/// Index ranges of the four rank bands for `total` records
///
/// Band width is `ceil(total / 4)`; the last band takes whatever remains and
/// may be smaller or empty.
pub fn quartile_bands(total: usize) -> [Range<usize>; 4] {
    let width = total.div_ceil(4);
    let bound = |k: usize| (k * width).min(total);
    [
        bound(0)..bound(1),
        bound(1)..bound(2),
        bound(2)..bound(3),
        bound(3)..total,
    ]
}

/// Keep only the requested impact-factor rank bands, in request order
///
/// Works on a copy sorted by impact factor descending; this is a ranking
/// partition, not a statistical quartile of the values.
pub fn quartile_filter(records: &[CanonicalRecord], quartiles: &[Quartile]) -> Vec<CanonicalRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.impact_factor_value().total_cmp(&a.impact_factor_value()));

    let bands = quartile_bands(ranked.len());
    quartiles
        .iter()
        .flat_map(|q| ranked[bands[q.index()].clone()].iter().cloned())
        .collect()
}

/// Field a sort request resolves to
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    ImpactFactor,
    CiteScore,
    Title,
    Publisher,
    Other(String),
}

impl SortKey {
    fn parse(field: &str) -> SortKey {
        match field.trim().to_ascii_lowercase().as_str() {
            "impactfactor" => SortKey::ImpactFactor,
            "citescore" => SortKey::CiteScore,
            "title" => SortKey::Title,
            "publisher" => SortKey::Publisher,
            _ => SortKey::Other(field.trim().to_string()),
        }
    }

    fn is_textual(&self) -> bool {
        matches!(self, SortKey::Title | SortKey::Publisher)
    }

    fn compare(&self, collation: &TextCollation, a: &CanonicalRecord, b: &CanonicalRecord) -> Ordering {
        match self {
            SortKey::ImpactFactor => a.impact_factor_value().total_cmp(&b.impact_factor_value()),
            SortKey::CiteScore => a.cite_score_value().total_cmp(&b.cite_score_value()),
            SortKey::Title => collation.compare(&a.title, &b.title),
            SortKey::Publisher => collation.compare(
                a.publisher.as_deref().unwrap_or(""),
                b.publisher.as_deref().unwrap_or(""),
            ),
            SortKey::Other(name) => a
                .text_field(name)
                .unwrap_or("")
                .cmp(b.text_field(name).unwrap_or("")),
        }
    }
}

/// Root-locale collation at secondary strength: accents order next to their
/// base letter, case is ignored. Ties are broken on the original text.
struct TextCollation(Option<Collator>);

impl TextCollation {
    fn root() -> Self {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        match Collator::try_new(&Default::default(), options) {
            Ok(collator) => TextCollation(Some(collator)),
            Err(e) => {
                warn!(error = ?e, "Root collator unavailable, falling back to case folding");
                TextCollation(None)
            }
        }
    }

    /// Plain case folding, for keys that never reach text comparison
    fn folding() -> Self {
        TextCollation(None)
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        let primary = match &self.0 {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        };
        primary.then_with(|| a.cmp(b))
    }
}

/// Stable sort by the requested field; descending unless `asc` is given
pub fn sort_records(records: &mut [CanonicalRecord], sorting: &Sorting) {
    let Some(field) = sorting.field.as_deref().filter(|f| !f.trim().is_empty()) else {
        return;
    };
    let key = SortKey::parse(field);
    let order = sorting.order();
    let collation = if key.is_textual() {
        TextCollation::root()
    } else {
        TextCollation::folding()
    };

    debug!(field = field, order = ?order, "Sorting results");

    records.sort_by(|a, b| match order {
        SortOrder::Asc => key.compare(&collation, a, b),
        SortOrder::Desc => key.compare(&collation, b, a),
    });
}

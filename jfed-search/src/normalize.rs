//! Row normalization
//!
//! Each store has one fixed row shape: which raw columns feed which
//! canonical field, and where the publisher name comes from. Normalization
//! is a pure, order-preserving map with no filtering. An unknown store
//! yields no records.

use jfed_common::{CanonicalRecord, MetricValue};
use serde_json::Value;

use crate::executor::RawRow;

/// Canonical record field a raw column feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Canonical {
    Title,
    Issn,
    CiteScore,
    ImpactFactor,
    AimsAndScope,
    Indexed,
    Link,
    SubjectArea,
    Keywords,
}

/// Where a store's publisher name comes from
#[derive(Debug, Clone, Copy)]
enum PublisherSource {
    /// Store holds a single publisher's catalog
    Fixed(&'static str),
    /// Publisher is a column of the row
    Column(&'static str),
}

/// Column layout of one store. For each canonical field the candidate
/// columns are tried in order and the first non-blank value wins.
struct RowShape {
    store: &'static str,
    publisher: PublisherSource,
    columns: &'static [(Canonical, &'static [&'static str])],
    /// Value forced into `indexed` regardless of row content
    fixed_indexed: Option<&'static str>,
}

use Canonical::*;

const PUBLISHER_COLUMNS: &[(Canonical, &[&str])] = &[
    (Title, &["title"]),
    (Issn, &["issn"]),
    (CiteScore, &["cite_score"]),
    (ImpactFactor, &["impact_factor"]),
    (AimsAndScope, &["aims_and_scope"]),
    (Indexed, &["indexed"]),
    (Link, &["link"]),
];

static ROW_SHAPES: &[RowShape] = &[
    RowShape {
        store: "annex.db",
        publisher: PublisherSource::Column("publisher"),
        columns: &[
            (Title, &["title"]),
            (Issn, &["issn"]),
            (CiteScore, &["cite_score"]),
            (ImpactFactor, &["impact_factor"]),
            (AimsAndScope, &["aims_and_scope"]),
            (Indexed, &["indexed"]),
            (Link, &["link"]),
            (SubjectArea, &["subject_area"]),
        ],
        fixed_indexed: None,
    },
    RowShape {
        store: "elsevier_journals.db",
        publisher: PublisherSource::Fixed("Elsevier"),
        columns: PUBLISHER_COLUMNS,
        fixed_indexed: None,
    },
    RowShape {
        store: "emerald_journals.db",
        publisher: PublisherSource::Fixed("Emerald"),
        columns: PUBLISHER_COLUMNS,
        fixed_indexed: None,
    },
    RowShape {
        store: "inderscience_journals.db",
        publisher: PublisherSource::Fixed("Inderscience"),
        columns: &[
            (Title, &["title"]),
            (Issn, &["print_issn"]),
            (CiteScore, &["cite_score"]),
            (ImpactFactor, &["impact_factor"]),
            (AimsAndScope, &["aims_and_scope"]),
            (Indexed, &["indexed"]),
            (Link, &["link"]),
        ],
        fixed_indexed: None,
    },
    RowShape {
        store: "ugc.db",
        publisher: PublisherSource::Column("publisher"),
        columns: &[
            (Title, &["journal_title"]),
            (Issn, &["issn"]),
            (CiteScore, &["CiteScore"]),
            (Indexed, &["indexed"]),
            (SubjectArea, &["SubjectArea"]),
            (Keywords, &["keywords"]),
        ],
        fixed_indexed: None,
    },
    RowShape {
        store: "wiley_db.db",
        publisher: PublisherSource::Fixed("Wiley"),
        columns: PUBLISHER_COLUMNS,
        fixed_indexed: None,
    },
    RowShape {
        store: "world_scientific_journals.db",
        publisher: PublisherSource::Fixed("World Scientific"),
        columns: PUBLISHER_COLUMNS,
        fixed_indexed: None,
    },
    RowShape {
        store: "springer_journals.db",
        publisher: PublisherSource::Fixed("Springer"),
        columns: &[
            (Title, &["title"]),
            (Issn, &["print_issn", "electronic_issn"]),
            (CiteScore, &["cite_score"]),
            (ImpactFactor, &["impact_factor"]),
            (AimsAndScope, &["aims_and_scope"]),
            (Indexed, &["indexed"]),
            (Link, &["link"]),
        ],
        fixed_indexed: None,
    },
    RowShape {
        store: "sage.db",
        publisher: PublisherSource::Fixed("SAGE"),
        columns: PUBLISHER_COLUMNS,
        fixed_indexed: None,
    },
    RowShape {
        store: "tandf_journal_details.db",
        publisher: PublisherSource::Fixed("Taylor & Francis"),
        columns: PUBLISHER_COLUMNS,
        fixed_indexed: None,
    },
    RowShape {
        store: "journal_details.db",
        publisher: PublisherSource::Column("publisher"),
        columns: &[
            (Title, &["title"]),
            (Issn, &["issn"]),
            (CiteScore, &["cite_score"]),
            (ImpactFactor, &["impact_factor"]),
            (AimsAndScope, &["aims_and_scope"]),
            (Link, &["link"]),
        ],
        fixed_indexed: Some("Scopus"),
    },
];

/// Canonicalize `rows` read from `store`
pub fn normalize(store: &str, rows: &[RawRow]) -> Vec<CanonicalRecord> {
    let Some(shape) = ROW_SHAPES.iter().find(|s| s.store == store) else {
        return Vec::new();
    };
    rows.iter().map(|row| shape.apply(row)).collect()
}

/// True when a row shape exists for `store`
pub fn has_shape(store: &str) -> bool {
    ROW_SHAPES.iter().any(|s| s.store == store)
}

impl RowShape {
    fn apply(&self, row: &RawRow) -> CanonicalRecord {
        let mut record = CanonicalRecord {
            publisher: match self.publisher {
                PublisherSource::Fixed(name) => Some(name.to_string()),
                PublisherSource::Column(column) => row.get(column).and_then(as_text),
            },
            ..Default::default()
        };

        for (field, candidates) in self.columns {
            let value = candidates
                .iter()
                .filter_map(|column| row.get(*column))
                .find(|value| !is_blank(value));

            match field {
                Title => record.title = value.and_then(as_text).unwrap_or_default(),
                Issn => record.issn = value.and_then(as_text).unwrap_or_default(),
                CiteScore => record.cite_score = value.and_then(as_metric),
                ImpactFactor => record.impact_factor = value.and_then(as_metric),
                AimsAndScope => record.aims_and_scope = Some(text_or_empty(value)),
                Indexed => record.indexed = Some(text_or_empty(value)),
                Link => record.link = Some(text_or_empty(value)),
                SubjectArea => record.subject_area = value.and_then(as_text),
                Keywords => record.keywords = value.and_then(as_text),
            }
        }

        if let Some(indexed) = self.fixed_indexed {
            record.indexed = Some(indexed.to_string());
        }

        record
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn text_or_empty(value: Option<&Value>) -> String {
    value.and_then(as_text).unwrap_or_default()
}

fn as_metric(value: &Value) -> Option<MetricValue> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64().map(MetricValue::Number),
        Value::String(s) => Some(MetricValue::Text(s.clone())),
        other => Some(MetricValue::Text(other.to_string())),
    }
}

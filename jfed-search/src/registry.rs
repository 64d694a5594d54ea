//! Field mapping registry
//!
//! Maps each logical field to the concrete column that carries it in each
//! backing store. The table is data, not code: supporting a new store means
//! adding rows here. A store with no row for a field simply does not
//! support that field, and every caller treats that as "skip", never as an
//! error.

/// Queryable logical field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Title,
    Issn,
    Link,
    AimsAndScope,
    Indexed,
    CiteScore,
    ImpactFactor,
}

impl LogicalField {
    pub const ALL: [LogicalField; 7] = [
        LogicalField::Title,
        LogicalField::Issn,
        LogicalField::Link,
        LogicalField::AimsAndScope,
        LogicalField::Indexed,
        LogicalField::CiteScore,
        LogicalField::ImpactFactor,
    ];

    /// Resolve a client search-field name to a searchable logical field
    ///
    /// Only title, ISSN and aims & scope are text-searchable. Matching is
    /// case-insensitive and accepts the spellings clients send for aims &
    /// scope.
    pub fn from_search_field(name: &str) -> Option<LogicalField> {
        match name.trim().to_ascii_lowercase().as_str() {
            "title" => Some(LogicalField::Title),
            "issn" => Some(LogicalField::Issn),
            "aimsandscope" | "aims & scope" | "aims and scope" => Some(LogicalField::AimsAndScope),
            _ => None,
        }
    }
}

/// One registry row: `field` is stored in `column` of `store`
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub field: LogicalField,
    pub store: &'static str,
    pub column: &'static str,
}

const fn map(field: LogicalField, store: &'static str, column: &'static str) -> FieldMapping {
    FieldMapping { field, store, column }
}

use LogicalField::*;

pub static FIELD_MAPPINGS: &[FieldMapping] = &[
    // title
    map(Title, "annex.db", "title"),
    map(Title, "elsevier_journals.db", "title"),
    map(Title, "emerald_journals.db", "title"),
    map(Title, "inderscience_journals.db", "title"),
    map(Title, "ugc.db", "journal_title"),
    map(Title, "wiley_db.db", "title"),
    map(Title, "world_scientific_journals.db", "title"),
    map(Title, "springer_journals.db", "title"),
    map(Title, "sage.db", "title"),
    map(Title, "tandf_journal_details.db", "title"),
    map(Title, "journal_details.db", "title"),
    // link
    map(Link, "emerald_journals.db", "link"),
    map(Link, "inderscience_journals.db", "link"),
    map(Link, "wiley_db.db", "link"),
    map(Link, "world_scientific_journals.db", "link"),
    map(Link, "springer_journals.db", "link"),
    map(Link, "sage.db", "link"),
    map(Link, "tandf_journal_details.db", "link"),
    map(Link, "journal_details.db", "link"),
    // issn
    map(Issn, "annex.db", "issn"),
    map(Issn, "elsevier_journals.db", "issn"),
    map(Issn, "emerald_journals.db", "issn"),
    map(Issn, "inderscience_journals.db", "print_issn"),
    map(Issn, "ugc.db", "issn"),
    map(Issn, "wiley_db.db", "issn"),
    map(Issn, "world_scientific_journals.db", "issn"),
    map(Issn, "springer_journals.db", "print_issn"),
    map(Issn, "sage.db", "issn"),
    map(Issn, "tandf_journal_details.db", "issn"),
    map(Issn, "journal_details.db", "issn"),
    // aimsAndScope
    map(AimsAndScope, "elsevier_journals.db", "aims_and_scope"),
    map(AimsAndScope, "emerald_journals.db", "aims_and_scope"),
    map(AimsAndScope, "inderscience_journals.db", "aims_and_scope"),
    map(AimsAndScope, "wiley_db.db", "aims_and_scope"),
    map(AimsAndScope, "world_scientific_journals.db", "aims_and_scope"),
    map(AimsAndScope, "springer_journals.db", "aims_and_scope"),
    map(AimsAndScope, "sage.db", "aims_and_scope"),
    map(AimsAndScope, "tandf_journal_details.db", "aims_and_scope"),
    map(AimsAndScope, "journal_details.db", "aims_and_scope"),
    // indexed
    map(Indexed, "elsevier_journals.db", "indexed"),
    map(Indexed, "emerald_journals.db", "indexed"),
    map(Indexed, "inderscience_journals.db", "indexed"),
    map(Indexed, "ugc.db", "indexed"),
    map(Indexed, "wiley_db.db", "indexed"),
    map(Indexed, "world_scientific_journals.db", "indexed"),
    map(Indexed, "springer_journals.db", "indexed"),
    map(Indexed, "sage.db", "indexed"),
    map(Indexed, "tandf_journal_details.db", "indexed"),
    // citeScore
    map(CiteScore, "annex.db", "cite_score"),
    map(CiteScore, "elsevier_journals.db", "cite_score"),
    map(CiteScore, "emerald_journals.db", "cite_score"),
    map(CiteScore, "inderscience_journals.db", "cite_score"),
    map(CiteScore, "ugc.db", "CiteScore"),
    map(CiteScore, "wiley_db.db", "cite_score"),
    map(CiteScore, "world_scientific_journals.db", "cite_score"),
    map(CiteScore, "springer_journals.db", "cite_score"),
    map(CiteScore, "sage.db", "cite_score"),
    map(CiteScore, "tandf_journal_details.db", "cite_score"),
    map(CiteScore, "journal_details.db", "cite_score"),
    // impactFactor
    map(ImpactFactor, "elsevier_journals.db", "impact_factor"),
    map(ImpactFactor, "emerald_journals.db", "impact_factor"),
    map(ImpactFactor, "inderscience_journals.db", "impact_factor"),
    map(ImpactFactor, "wiley_db.db", "impact_factor"),
    map(ImpactFactor, "world_scientific_journals.db", "impact_factor"),
    map(ImpactFactor, "springer_journals.db", "impact_factor"),
    map(ImpactFactor, "sage.db", "impact_factor"),
    map(ImpactFactor, "tandf_journal_details.db", "impact_factor"),
    map(ImpactFactor, "journal_details.db", "impact_factor"),
];

/// Column carrying `field` in `store`, or `None` when the store lacks it
pub fn resolve_column(field: LogicalField, store: &str) -> Option<&'static str> {
    FIELD_MAPPINGS
        .iter()
        .find(|m| m.field == field && m.store == store)
        .map(|m| m.column)
}

/// Logical fields `store` supports, in [`LogicalField::ALL`] order
pub fn supported_fields(store: &str) -> Vec<LogicalField> {
    LogicalField::ALL
        .into_iter()
        .filter(|field| resolve_column(*field, store).is_some())
        .collect()
}

/// Indexing scheme tag -> substrings identifying it in a free-text `indexed` column
static INDEXING_KEYWORDS: &[(&str, &[&str])] = &[
    ("Scopus", &["scopus", "elsevier scopus"]),
    ("SCI", &["sci", "science citation index"]),
    ("SCIE", &["scie", "science citation index expanded"]),
    ("EI", &["ei compendex", "engineering index"]),
    ("ESCI", &["esci", "emerging sources citation index"]),
    ("UGC", &["ugc", "ugc-care"]),
    ("Pubmed/Medline", &["pubmed", "medline"]),
    ("ABDC", &["abdc", "australian business deans council"]),
    ("NAAS", &["naas", "national academy of agricultural sciences"]),
];

/// Keywords identifying `scheme_tag`; empty for unknown tags
pub fn indexing_keyword_set(scheme_tag: &str) -> &'static [&'static str] {
    INDEXING_KEYWORDS
        .iter()
        .find(|(tag, _)| *tag == scheme_tag)
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[])
}

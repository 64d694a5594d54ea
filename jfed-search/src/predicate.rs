//! Store-specific predicate construction
//!
//! Turns a logical [`Filter`] into a WHERE clause plus positional parameters
//! for one store, resolving every logical field through the registry. Axes
//! the store cannot express are dropped silently: the store is simply not
//! constrained on them.
//!
//! Predicates are built fresh per request and per store; column names differ
//! between stores so they are never shared.

use jfed_common::Filter;

use crate::executor::SqlParam;
use crate::registry::{self, LogicalField};

/// WHERE clause (without the keyword) and its ordered parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub where_clause: Option<String>,
    pub params: Vec<SqlParam>,
}

impl Predicate {
    /// True when the predicate places no constraint at all
    pub fn is_unconstrained(&self) -> bool {
        self.where_clause.is_none()
    }

    /// Full `SELECT *` statement against `table`
    pub fn select_sql(&self, table: &str) -> String {
        match &self.where_clause {
            Some(clause) => format!("SELECT * FROM {} WHERE {}", quote_ident(table), clause),
            None => format!("SELECT * FROM {}", quote_ident(table)),
        }
    }
}

/// Build the predicate for `filter` against `store`
pub fn build(filter: &Filter, store: &str) -> Predicate {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<SqlParam> = Vec::new();

    // Search text: requested fields are alternative match sites, ORed in one group
    if let Some(text) = filter.search_text() {
        let mut matched: Vec<LogicalField> = Vec::new();
        let mut search_conditions = Vec::new();

        for name in &filter.search_fields {
            let Some(field) = LogicalField::from_search_field(name) else {
                continue;
            };
            if matched.contains(&field) {
                continue;
            }
            matched.push(field);

            if let Some(column) = registry::resolve_column(field, store) {
                search_conditions.push(format!("{} LIKE ?", quote_ident(column)));
                params.push(SqlParam::Text(format!("%{}%", text)));
            }
        }

        if !search_conditions.is_empty() {
            conditions.push(format!("({})", search_conditions.join(" OR ")));
        }
    }

    // Indexing schemes: any keyword of any requested scheme
    if !filter.databases.is_empty() {
        if let Some(column) = registry::resolve_column(LogicalField::Indexed, store) {
            let mut indexing_conditions = Vec::new();
            for tag in &filter.databases {
                for keyword in registry::indexing_keyword_set(tag) {
                    indexing_conditions.push(format!("{} LIKE ?", quote_ident(column)));
                    params.push(SqlParam::Text(format!("%{}%", keyword)));
                }
            }
            if !indexing_conditions.is_empty() {
                conditions.push(format!("({})", indexing_conditions.join(" OR ")));
            }
        }
    }

    // Numeric ranges: stores keep these as text, blanks must become NULL before the cast
    let ranges = [
        (LogicalField::CiteScore, filter.cite_score_range),
        (LogicalField::ImpactFactor, filter.impact_factor_range),
    ];
    for (field, range) in ranges {
        let Some(range) = range else { continue };
        if let Some(column) = registry::resolve_column(field, store) {
            conditions.push(format!(
                "CAST(NULLIF({}, '') AS REAL) BETWEEN ? AND ?",
                quote_ident(column)
            ));
            params.push(SqlParam::Real(range.min));
            params.push(SqlParam::Real(range.max));
        }
    }

    Predicate {
        where_clause: (!conditions.is_empty()).then(|| conditions.join(" AND ")),
        params,
    }
}

/// Predicate matching any of `issns` in the store's ISSN column
///
/// Returns `None` when the store has no ISSN column or the batch is empty.
pub fn issn_batch(store: &str, issns: &[String]) -> Option<Predicate> {
    if issns.is_empty() {
        return None;
    }
    let column = registry::resolve_column(LogicalField::Issn, store)?;
    let condition = format!("{} LIKE ?", quote_ident(column));

    Some(Predicate {
        where_clause: Some(vec![condition; issns.len()].join(" OR ")),
        params: issns
            .iter()
            .map(|issn| SqlParam::Text(format!("%{}%", issn)))
            .collect(),
    })
}

/// Quote an identifier for SQLite
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

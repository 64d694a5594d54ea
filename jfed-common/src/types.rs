//! Shared request/response types
//!
//! Types exchanged between clients and the federation service: the filter
//! object a search is described by, the sorting request, the canonical
//! journal record every backing store is normalized into, and the response
//! envelopes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Indexing-scheme tag that selects the annexure cross-reference path
pub const ANNEXURE_TAG: &str = "Annexure";

// ========================================
// Filter
// ========================================

/// Client-supplied search criteria
///
/// Every axis is optional; an absent or empty axis places no constraint on
/// the search. `null` is accepted wherever a list is expected.
///
/// # Examples
///
/// ```
/// use jfed_common::Filter;
///
/// let filter: Filter = serde_json::from_str(r#"{
///     "searchText": "network",
///     "searchFields": ["title"],
///     "publishers": ["Elsevier"],
///     "citeScoreRange": [1, 20]
/// }"#).unwrap();
///
/// assert!(filter.searches_title());
/// assert_eq!(filter.cite_score_range.unwrap().max, 20.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filter {
    /// Free text matched with `LIKE %text%`
    pub search_text: Option<String>,

    /// Logical fields the search text is matched against
    #[serde(deserialize_with = "null_as_empty")]
    pub search_fields: Vec<String>,

    /// Indexing-scheme tags (Scopus, SCI, UGC, Annexure, ...)
    #[serde(deserialize_with = "null_as_empty")]
    pub databases: Vec<String>,

    /// Publisher names, each routed to its dedicated store
    #[serde(alias = "publisher", deserialize_with = "null_as_empty")]
    pub publishers: Vec<String>,

    /// Closed CiteScore interval
    pub cite_score_range: Option<NumericRange>,

    /// Closed impact factor interval
    pub impact_factor_range: Option<NumericRange>,

    /// Rank-based impact factor bands to keep
    #[serde(deserialize_with = "null_as_empty")]
    pub quartiles: Vec<Quartile>,
}

impl Filter {
    /// Search text, if one was supplied and it is non-empty
    pub fn search_text(&self) -> Option<&str> {
        self.search_text.as_deref().filter(|text| !text.is_empty())
    }

    /// True when `title` is among the requested search fields
    pub fn searches_title(&self) -> bool {
        self.search_fields
            .iter()
            .any(|field| field.trim().eq_ignore_ascii_case("title"))
    }

    /// True when the indexing-scheme tag list contains `tag`
    pub fn has_database(&self, tag: &str) -> bool {
        self.databases.iter().any(|d| d == tag)
    }

    /// Copy of this filter with store selection (publishers, databases) removed
    pub fn without_store_selection(&self) -> Filter {
        Filter {
            databases: Vec::new(),
            publishers: Vec::new(),
            ..self.clone()
        }
    }

    /// Requested quartiles in request order with repeats removed
    pub fn requested_quartiles(&self) -> Vec<Quartile> {
        let mut seen = Vec::with_capacity(4);
        for q in &self.quartiles {
            if !seen.contains(q) {
                seen.push(*q);
            }
        }
        seen
    }

    /// Reject filters whose numeric ranges cannot be evaluated
    pub fn validate(&self) -> Result<()> {
        if let Some(range) = &self.cite_score_range {
            range.validate("citeScoreRange")?;
        }
        if let Some(range) = &self.impact_factor_range {
            range.validate("impactFactorRange")?;
        }
        Ok(())
    }
}

/// Closed numeric interval, carried on the wire as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::InvalidInput(format!("{} bounds must be finite", name)));
        }
        if self.min > self.max {
            return Err(Error::InvalidInput(format!(
                "{} minimum {} exceeds maximum {}",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

impl From<[f64; 2]> for NumericRange {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<NumericRange> for [f64; 2] {
    fn from(range: NumericRange) -> Self {
        [range.min, range.max]
    }
}

/// Rank-based quarter of the result set ordered by impact factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quartile {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quartile {
    /// Zero-based band index
    pub fn index(self) -> usize {
        match self {
            Quartile::Q1 => 0,
            Quartile::Q2 => 1,
            Quartile::Q3 => 2,
            Quartile::Q4 => 3,
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ========================================
// Sorting
// ========================================

/// Requested result ordering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sorting {
    /// Canonical field name (impactFactor, citeScore, title, publisher, ...)
    #[serde(default)]
    pub field: Option<String>,

    /// Sort direction; descending when absent
    #[serde(default)]
    pub order: Option<SortOrder>,
}

impl Sorting {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: Some(field.into()),
            order: Some(order),
        }
    }

    /// Effective sort direction
    pub fn order(&self) -> SortOrder {
        self.order.unwrap_or_default()
    }
}

/// Sort direction, parsed case-insensitively
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::InvalidInput(format!(
                "sort order must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ========================================
// Canonical journal record
// ========================================

/// Numeric metric as stored by a backing store
///
/// Stores persist CiteScore and impact factor either as numbers or as free
/// text ("3.1", "", "N/A"). The original representation is kept for the
/// response; comparisons go through [`MetricValue::as_f64`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Numeric reading of the value; anything unparseable reads as 0
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Number(n) if n.is_finite() => *n,
            MetricValue::Number(_) => 0.0,
            MetricValue::Text(s) => parse_leading_float(s).unwrap_or(0.0),
        }
    }
}

/// Parse the longest leading decimal literal of `s` ("3.5 (2023)" -> 3.5)
fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One journal entry in the unified schema
///
/// `title` and `issn` are always present (possibly empty); everything else
/// is omitted from the JSON output when the source store does not carry it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cite_score: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_factor: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aims_and_scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl CanonicalRecord {
    /// Impact factor as a number (missing or unparseable -> 0)
    pub fn impact_factor_value(&self) -> f64 {
        self.impact_factor.as_ref().map_or(0.0, MetricValue::as_f64)
    }

    /// CiteScore as a number (missing or unparseable -> 0)
    pub fn cite_score_value(&self) -> f64 {
        self.cite_score.as_ref().map_or(0.0, MetricValue::as_f64)
    }

    /// Text-valued field by canonical name, matched case-insensitively
    ///
    /// Returns `None` both for absent values and for names that are not
    /// text fields of the record.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        match name.to_ascii_lowercase().as_str() {
            "title" => Some(self.title.as_str()),
            "issn" => Some(self.issn.as_str()),
            "publisher" => self.publisher.as_deref(),
            "aimsandscope" => self.aims_and_scope.as_deref(),
            "indexed" => self.indexed.as_deref(),
            "link" => self.link.as_deref(),
            "subjectarea" => self.subject_area.as_deref(),
            "keywords" => self.keywords.as_deref(),
            _ => None,
        }
    }
}

// ========================================
// Envelopes
// ========================================

/// Search request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub filters: Filter,
    #[serde(default)]
    pub sorting: Option<Sorting>,
}

/// Successful search response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<CanonicalRecord>,
    pub total_results: usize,
    pub queried_stores: Vec<String>,
    pub is_annexure: bool,
    pub used_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Failed search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

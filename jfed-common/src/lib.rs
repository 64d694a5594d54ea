//! # jfed Common Library
//!
//! Shared code for the journal federation service:
//! - Request/response types (filters, sorting, canonical journal records)
//! - Configuration resolution
//! - Common error type

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{CanonicalRecord, Filter, MetricValue, Quartile, SortOrder, Sorting};

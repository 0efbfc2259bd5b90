//! Query translation and result shaping for the Question Period notes search.
//!
//! This crate turns loosely structured request parameters (free text, pipe
//! delimited facet selections, sort and page) into a search engine query plan,
//! and reshapes the engine's response into structures a presentation layer can
//! render directly:
//! - Facet codec: pipe-delimited selections to tagged filter clauses
//! - Query plan: fields, boosts, facets, highlighting, sort and paging
//! - Result shaping: highlight substitution, facet count lists, pagination windows
//!
//! Nothing here performs I/O. The HTTP client lives in `qpnotes-solr`.
//!
//! # Example
//!
//! ```
//! use qpnotes_query::{Language, QueryPlan, SearchRequest};
//!
//! let pairs = vec![
//!     ("search_text".to_string(), "budget".to_string()),
//!     ("qp-search-year".to_string(), "2020|2021".to_string()),
//!     ("page".to_string(), "2".to_string()),
//! ];
//! let request = SearchRequest::from_pairs(Language::En, &pairs);
//! let plan = QueryPlan::search(&request, 10);
//!
//! assert_eq!(plan.start(), 10);
//! assert_eq!(plan.filters.len(), 1);
//! assert_eq!(
//!     plan.filters[0].to_string(),
//!     r#"{!tag=tag_year_i}year_i:("2020" OR "2021")"#
//! );
//! ```

#![forbid(unsafe_code)]

mod error;
pub mod facet;
mod language;
pub mod paging;
pub mod plan;
pub mod response;
pub mod schema;
pub mod shape;
pub mod sort;
pub mod terms;

pub use error::{Error, Result};
pub use facet::{FacetFilters, FacetKind, FacetSelection, FilterClause};
pub use language::Language;
pub use paging::{page_count, pagination_window, PageLinks};
pub use plan::{HighlightConfig, Paging, QueryPlan, SearchRequest, TextQueryExtras};
pub use response::{Document, SelectResponse};
pub use schema::{FieldSchema, QueryField};
pub use shape::{facet_counts, merge_highlights, FacetCount, HighlightMarkers};
pub use sort::SortOrder;

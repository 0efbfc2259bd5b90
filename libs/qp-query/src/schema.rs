//! Field schemas for the Question Period notes core.
//!
//! Both languages share one set of templates; `{l}` is replaced by the
//! language code when a schema is built.

use std::fmt;

use crate::facet::FacetKind;
use crate::language::Language;

const SEARCH_FIELDS: &[&str] = &[
    "id",
    "reference_number_s",
    "title_{l}_txt",
    "minister_{l}_txt",
    "minister_position_{l}_s",
    "minister_position_{l}_txt",
    "question_{l}_txt",
    "background_{l}_txt",
    "response_{l}_txt",
    "additional_information_{l}_txt",
    "date_received_dt",
    "month_i",
    "year_i",
    "owner_org_title_txt_{l}",
    "owner_org_{l}_s",
];

const SEARCH_QUERY_FIELDS: &[(&str, u32)] = &[
    ("reference_number_s", 5),
    ("title_{l}_txt", 5),
    ("minister_position_{l}_txt", 4),
    ("minister_{l}_txt", 4),
    ("question_{l}_txt", 4),
    ("owner_org_title_txt_{l}", 4),
    ("background_{l}_txt", 3),
    ("response_{l}_txt", 3),
    ("additional_information_{l}_txt", 3),
];

const HIGHLIGHT_FIELDS: &[&str] = &[
    "question_{l}_txt",
    "title_{l}_txt",
    "owner_org_title_txt_{l}",
    "minister_{l}_txt",
    "minister_position_{l}_s",
    "minister_position_{l}_txt",
];

// Exports read the stored string copies so cells hold the original text.
const EXPORT_FIELDS: &[&str] = &[
    "id",
    "reference_number_s",
    "title_{l}_s",
    "minister_{l}_s",
    "minister_position_{l}_s",
    "question_{l}_s",
    "background_{l}_s",
    "response_{l}_s",
    "additional_information_{l}_s",
    "date_received_dt",
    "month_i",
    "year_i",
    "owner_org_{l}_s",
];

const EXPORT_QUERY_FIELDS: &[(&str, u32)] = &[
    ("reference_number_s", 5),
    ("title_{l}_txt", 5),
    ("minister_{l}_txt", 4),
    ("question_{l}_txt", 4),
    ("owner_org_title_txt_{l}", 4),
    ("background_{l}_txt", 3),
    ("response_{l}_txt", 3),
    ("additional_information_{l}_txt", 3),
];

/// A query field with its relevance boost (`name^boost`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryField {
    pub name: String,
    pub boost: u32,
}

impl fmt::Display for QueryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}^{}", self.name, self.boost)
    }
}

/// Per-language field lists used to assemble a query plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub language: Language,
    /// Fields to retrieve, in display order.
    pub fields: Vec<String>,
    /// Boosted fields searched by the free-text query.
    pub query_fields: Vec<QueryField>,
    /// Facet fields, each wrapped with its self-exclusion tag.
    pub facet_fields: Vec<String>,
    /// Fields eligible for highlighting.
    pub highlight_fields: Vec<String>,
}

impl FieldSchema {
    /// Schema for the interactive search page and the detail view.
    pub fn search(language: Language) -> Self {
        Self {
            language,
            fields: expand(language, SEARCH_FIELDS),
            query_fields: expand_boosted(language, SEARCH_QUERY_FIELDS),
            facet_fields: FacetKind::ALL
                .iter()
                .map(|kind| kind.exclusion_field(language))
                .collect(),
            highlight_fields: expand(language, HIGHLIGHT_FIELDS),
        }
    }

    /// Schema for CSV exports: stored string fields, no facets, no highlighting.
    pub fn export(language: Language) -> Self {
        Self {
            language,
            fields: expand(language, EXPORT_FIELDS),
            query_fields: expand_boosted(language, EXPORT_QUERY_FIELDS),
            facet_fields: Vec::new(),
            highlight_fields: Vec::new(),
        }
    }
}

fn expand(language: Language, templates: &[&str]) -> Vec<String> {
    templates.iter().map(|t| language.field(t)).collect()
}

fn expand_boosted(language: Language, templates: &[(&str, u32)]) -> Vec<QueryField> {
    templates
        .iter()
        .map(|(t, boost)| QueryField {
            name: language.field(t),
            boost: *boost,
        })
        .collect()
}

//! Search engine response model (`wt=json` select handler output).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One returned document: field name to value, multi-valued fields as arrays.
pub type Document = serde_json::Map<String, Value>;

/// Highlight fragments keyed by document id, then by field.
pub type Highlighting = HashMap<String, HashMap<String, Vec<String>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectResponse {
    pub response: ResultSet,

    #[serde(default)]
    pub highlighting: Highlighting,

    #[serde(default)]
    pub facet_counts: FacetCounts,

    /// Present when the request used cursor paging.
    #[serde(default, rename = "nextCursorMark", skip_serializing_if = "Option::is_none")]
    pub next_cursor_mark: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(rename = "numFound")]
    pub num_found: u64,

    #[serde(default)]
    pub start: u64,

    #[serde(default)]
    pub docs: Vec<Document>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetCounts {
    /// Facet field to flat `[value, count, value, count, ...]` list.
    #[serde(default)]
    pub facet_fields: HashMap<String, Vec<Value>>,
}

impl SelectResponse {
    pub fn hits(&self) -> u64 {
        self.response.num_found
    }

    pub fn docs(&self) -> &[Document] {
        &self.response.docs
    }

    /// Flat facet list for `field`; empty when the engine returned none.
    pub fn facet_list(&self, field: &str) -> &[Value] {
        self.facet_counts
            .facet_fields
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Document id as a string, whether the engine stored it as text or number.
pub fn document_id(doc: &Document) -> Option<String> {
    match doc.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

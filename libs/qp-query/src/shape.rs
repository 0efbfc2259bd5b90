//! Result shaping: highlight substitution and facet count lists.

use serde::Serialize;
use serde_json::Value;

use crate::response::{document_id, Document, Highlighting};

/// Strings wrapped around matched text by the highlighter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMarkers {
    pub pre: String,
    pub post: String,
}

impl Default for HighlightMarkers {
    fn default() -> Self {
        Self {
            pre: "<mark>".to_string(),
            post: "</mark>".to_string(),
        }
    }
}

impl HighlightMarkers {
    /// Plain text of a highlighted fragment.
    pub fn strip(&self, fragment: &str) -> String {
        fragment.replace(&self.pre, "").replace(&self.post, "")
    }
}

/// Substitute highlight fragments into the fetched documents.
///
/// A single-valued field is replaced by its first fragment. In a multi-valued
/// field only the elements whose text equals a fragment's plain text are
/// replaced; fragments matching nothing are ignored.
pub fn merge_highlights(docs: &mut [Document], highlighting: &Highlighting, markers: &HighlightMarkers) {
    if highlighting.is_empty() {
        return;
    }
    for doc in docs.iter_mut() {
        let Some(entry) = document_id(doc).and_then(|id| highlighting.get(&id)) else {
            continue;
        };
        for (field, fragments) in entry {
            let Some(first) = fragments.first() else {
                continue;
            };
            match doc.get_mut(field) {
                Some(Value::Array(values)) => {
                    for fragment in fragments {
                        let plain = markers.strip(fragment);
                        for value in values.iter_mut() {
                            if value.as_str() == Some(plain.as_str()) {
                                *value = Value::String(fragment.clone());
                            }
                        }
                    }
                }
                Some(value) => *value = Value::String(first.clone()),
                None => {}
            }
        }
    }
}

/// One facet value with its document count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// Convert the engine's flat `[value, count, ...]` list into ordered pairs.
///
/// Engine order is kept unless `reverse` is set, which sorts by value
/// descending. A trailing value without a count is dropped, as are pairs
/// whose count is not a non-negative integer.
pub fn facet_counts(list: &[Value], reverse: bool) -> Vec<FacetCount> {
    let mut counts: Vec<FacetCount> = list
        .chunks_exact(2)
        .filter_map(|pair| {
            let value = match &pair[0] {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            let count = pair[1].as_u64()?;
            Some(FacetCount { value, count })
        })
        .collect();

    if reverse {
        counts.sort_by(|a, b| b.value.cmp(&a.value));
    }
    counts
}

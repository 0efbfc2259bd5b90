//! Query builder: assembles the outbound engine query from a request.

use crate::facet::{quote, FacetFilters, FilterClause};
use crate::language::Language;
use crate::paging::{parse_page, start_row};
use crate::schema::{FieldSchema, QueryField};
use crate::shape::HighlightMarkers;
use crate::sort::{SortOrder, EXPORT_SORT};
use crate::terms::{search_terms, MATCH_ALL};

const PHRASE_SLOP: u32 = 10;
const MIN_MATCH: &str = "3<70%";
const RECENT_BOOST: &str = "date_received_dt:[NOW/DAY-2YEAR TO NOW/DAY]";
const HIGHLIGHT_METHOD: &str = "unified";
const HIGHLIGHT_SNIPPETS: u32 = 10;

/// Search request parameters, as decoded from the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub language: Language,
    pub search_text: Option<String>,
    pub facets: FacetFilters,
    pub sort: Option<String>,
    /// 1-based, already clamped to at least 1.
    pub page: u64,
}

impl SearchRequest {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            search_text: None,
            facets: FacetFilters::new(),
            sort: None,
            page: 1,
        }
    }

    /// Build a request from decoded query pairs; the last of a repeated name wins.
    pub fn from_pairs(language: Language, pairs: &[(String, String)]) -> Self {
        let last = |name: &str| {
            pairs
                .iter()
                .rev()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };
        Self {
            language,
            search_text: last("search_text").map(str::to_string),
            facets: FacetFilters::from_pairs(pairs),
            sort: last("sort").map(str::to_string),
            page: parse_page(last("page")),
        }
    }

    /// Engine query string for the free text.
    pub fn terms(&self) -> String {
        search_terms(self.search_text.as_deref())
    }

    pub fn sort_order(&self) -> SortOrder {
        SortOrder::from_param(self.sort.as_deref(), self.language)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    pub markers: HighlightMarkers,
    pub method: String,
    pub snippets: u32,
    pub fields: Vec<String>,
    pub preserve_multi: bool,
}

/// Relevance extras that only make sense against a real text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQueryExtras {
    pub highlight: Option<HighlightConfig>,
    pub phrase_slop: Option<u32>,
    pub min_match: Option<String>,
    pub boost_query: Option<String>,
}

impl TextQueryExtras {
    /// Extras for the interactive search page.
    pub fn interactive(highlight_fields: Vec<String>) -> Self {
        Self {
            highlight: Some(HighlightConfig {
                markers: HighlightMarkers::default(),
                method: HIGHLIGHT_METHOD.to_string(),
                snippets: HIGHLIGHT_SNIPPETS,
                fields: highlight_fields,
                preserve_multi: true,
            }),
            phrase_slop: Some(PHRASE_SLOP),
            min_match: Some(MIN_MATCH.to_string()),
            boost_query: Some(RECENT_BOOST.to_string()),
        }
    }

    /// Extras for exports: minimum-match only.
    pub fn export() -> Self {
        Self {
            min_match: Some(MIN_MATCH.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paging {
    Offset { start: u64, rows: u64 },
    /// Deep paging over the whole result set; needs a sort on the unique key.
    Cursor { mark: String, rows: u64 },
}

/// Everything sent to the engine for one select call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub query: String,
    pub fields: Vec<String>,
    pub query_fields: Vec<QueryField>,
    pub facet_fields: Vec<String>,
    /// One clause per facet with a selection.
    pub filters: Vec<FilterClause>,
    pub extras: TextQueryExtras,
    pub sort: String,
    pub paging: Paging,
}

impl QueryPlan {
    /// One page of interactive search results.
    pub fn search(request: &SearchRequest, page_size: u64) -> Self {
        let schema = FieldSchema::search(request.language);
        let extras = TextQueryExtras::interactive(schema.highlight_fields.clone());
        Self::assemble(
            schema,
            request.terms(),
            request.facets.clauses(request.language),
            extras,
            request.sort_order().as_param(request.language),
            Paging::Offset {
                start: start_row(request.page, page_size),
                rows: page_size,
            },
        )
    }

    /// One batch of an export: same terms and filters, id order, cursor paging.
    pub fn export(request: &SearchRequest, batch_size: u64, cursor_mark: &str) -> Self {
        Self::assemble(
            FieldSchema::export(request.language),
            request.terms(),
            request.facets.clauses(request.language),
            TextQueryExtras::export(),
            EXPORT_SORT.to_string(),
            Paging::Cursor {
                mark: cursor_mark.to_string(),
                rows: batch_size,
            },
        )
    }

    /// A single note by id, without facets or relevance extras.
    pub fn detail(language: Language, id: &str) -> Self {
        let mut schema = FieldSchema::search(language);
        schema.facet_fields.clear();
        Self::assemble(
            schema,
            format!("id:{}", quote(id)),
            Vec::new(),
            TextQueryExtras::default(),
            SortOrder::Relevance.as_param(language),
            Paging::Offset { start: 0, rows: 1 },
        )
    }

    fn assemble(
        schema: FieldSchema,
        query: String,
        filters: Vec<FilterClause>,
        extras: TextQueryExtras,
        sort: String,
        paging: Paging,
    ) -> Self {
        // Highlighting and boosts are meaningless against match-all.
        let extras = if query == MATCH_ALL {
            TextQueryExtras::default()
        } else {
            extras
        };
        Self {
            query,
            fields: schema.fields,
            query_fields: schema.query_fields,
            facet_fields: schema.facet_fields,
            filters,
            extras,
            sort,
            paging,
        }
    }

    pub fn start(&self) -> u64 {
        match self.paging {
            Paging::Offset { start, .. } => start,
            Paging::Cursor { .. } => 0,
        }
    }

    pub fn rows(&self) -> u64 {
        match self.paging {
            Paging::Offset { rows, .. } | Paging::Cursor { rows, .. } => rows,
        }
    }

    pub fn highlighting(&self) -> Option<&HighlightConfig> {
        self.extras.highlight.as_ref()
    }

    /// Move a cursor-paged plan to the next batch.
    pub fn advance_cursor(&mut self, next_mark: &str) {
        if let Paging::Cursor { mark, .. } = &mut self.paging {
            *mark = next_mark.to_string();
        }
    }

    /// Encode the plan as select handler parameters. Repeated names are
    /// emitted as repeated pairs.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = Vec::new();
        let mut push = |name: &str, value: String| params.push((name.to_string(), value));

        push("wt", "json".to_string());
        push("defType", "edismax".to_string());
        push("q", self.query.clone());
        push("fl", self.fields.join(","));
        if !self.query_fields.is_empty() {
            let qf: Vec<String> = self.query_fields.iter().map(ToString::to_string).collect();
            push("qf", qf.join(" "));
        }

        if !self.facet_fields.is_empty() {
            push("facet", "on".to_string());
            push("facet.sort", "index".to_string());
            for field in &self.facet_fields {
                push("facet.field", field.clone());
            }
        }
        for filter in &self.filters {
            push("fq", filter.to_string());
        }

        push("sort", self.sort.clone());
        match &self.paging {
            Paging::Offset { start, rows } => {
                push("start", start.to_string());
                push("rows", rows.to_string());
            }
            Paging::Cursor { mark, rows } => {
                push("cursorMark", mark.clone());
                push("rows", rows.to_string());
            }
        }

        if let Some(hl) = &self.extras.highlight {
            push("hl", "on".to_string());
            push("hl.simple.pre", hl.markers.pre.clone());
            push("hl.simple.post", hl.markers.post.clone());
            push("hl.method", hl.method.clone());
            push("hl.snippets", hl.snippets.to_string());
            push("hl.fl", hl.fields.join(","));
            push("hl.preserveMulti", hl.preserve_multi.to_string());
        }
        if let Some(ps) = self.extras.phrase_slop {
            push("ps", ps.to_string());
        }
        if let Some(mm) = &self.extras.min_match {
            push("mm", mm.clone());
        }
        if let Some(bq) = &self.extras.boost_query {
            push("bq", bq.clone());
        }

        params
    }
}

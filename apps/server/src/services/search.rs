//! Search service - interactive search and note details
//!
//! Builds the query plan for a request, runs it, and shapes the response into
//! a page payload: highlighted documents, facet groups and pagination.

use std::sync::Arc;

use qpnotes_query::{
    facet_counts, merge_highlights, page_count, pagination_window, Document, FacetCount, FacetKind,
    Language, PageLinks, QueryPlan, SearchRequest, SelectResponse,
};
use qpnotes_solr::SearchBackend;
use serde::Serialize;

use crate::services::timed_select;
use crate::{Error, Result};

/// One facet as shown beside the results.
#[derive(Debug, Clone, Serialize)]
pub struct FacetGroup {
    pub facet: FacetKind,
    pub param: &'static str,
    /// The selection exactly as received.
    pub selected_raw: String,
    /// Literal split of the raw selection.
    pub selected: Vec<String>,
    pub counts: Vec<FacetCount>,
}

/// Everything a search results page needs.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub language: Language,
    pub search_text: String,
    pub sort: String,
    pub total_hits: u64,
    pub docs: Vec<Document>,
    pub pagination: Vec<u64>,
    pub current_page: u64,
    pub previous_page: u64,
    pub next_page: u64,
    pub last_page: u64,
    pub facets: Vec<FacetGroup>,
    pub export_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteDetail {
    pub language: Language,
    pub reference_number: String,
    pub document: Document,
    pub back_url: String,
}

pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    page_size: u64,
    year_facet_descending: bool,
}

impl SearchService {
    pub fn new(backend: Arc<dyn SearchBackend>, page_size: u64, year_facet_descending: bool) -> Self {
        Self {
            backend,
            page_size,
            year_facet_descending,
        }
    }

    /// Run one page of a search. `query_string` is the canonical re-encoding of
    /// the request parameters, used for the export link.
    pub async fn search(&self, request: &SearchRequest, query_string: &str) -> Result<SearchPage> {
        let plan = QueryPlan::search(request, self.page_size);
        tracing::debug!(
            language = %request.language,
            query = %plan.query,
            filters = plan.filters.len(),
            sort = %plan.sort,
            start = plan.start(),
            "Running search"
        );

        let response = timed_select(self.backend.as_ref(), "search", &plan.to_params()).await?;

        let hits = response.hits();
        if hits > 0 && plan.start() >= hits {
            let mut last_page = request.clone();
            last_page.page = page_count(hits, self.page_size).max(1);
            tracing::debug!(
                requested = request.page,
                page = last_page.page,
                "Requested page is past the end, showing the last page"
            );

            let plan = QueryPlan::search(&last_page, self.page_size);
            let response = timed_select(self.backend.as_ref(), "search", &plan.to_params()).await?;
            return Ok(self.shape(&last_page, &plan, response, query_string));
        }

        Ok(self.shape(request, &plan, response, query_string))
    }

    fn shape(
        &self,
        request: &SearchRequest,
        plan: &QueryPlan,
        response: SelectResponse,
        query_string: &str,
    ) -> SearchPage {
        let language = request.language;

        let facets = FacetKind::ALL
            .into_iter()
            .map(|kind| {
                let selection = request.facets.get(kind);
                let reverse = self.year_facet_descending && kind == FacetKind::Year;
                FacetGroup {
                    facet: kind,
                    param: kind.param(),
                    selected_raw: selection.raw().to_string(),
                    selected: selection.segments().into_iter().map(str::to_string).collect(),
                    counts: facet_counts(response.facet_list(&kind.field(language)), reverse),
                }
            })
            .collect();

        let total_hits = response.hits();
        let SelectResponse {
            response: result_set,
            highlighting,
            ..
        } = response;
        let mut docs = result_set.docs;
        if let Some(hl) = plan.highlighting() {
            merge_highlights(&mut docs, &highlighting, &hl.markers);
        }

        let pagination = pagination_window(total_hits, self.page_size, request.page);
        let links = PageLinks::new(&pagination, request.page);

        SearchPage {
            language,
            search_text: request.search_text.clone().unwrap_or_default(),
            sort: plan.sort.clone(),
            total_hits,
            docs,
            pagination,
            current_page: links.current,
            previous_page: links.previous,
            next_page: links.next,
            last_page: links.last,
            facets,
            export_url: format!("/{}/qp/export/?{}", language, query_string),
        }
    }

    /// Fetch a single note by its id.
    pub async fn detail(
        &self,
        language: Language,
        slug: &str,
        referer: Option<&str>,
    ) -> Result<NoteDetail> {
        let plan = QueryPlan::detail(language, slug);

        let response = timed_select(self.backend.as_ref(), "detail", &plan.to_params()).await?;
        let document = response
            .response
            .docs
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("note {slug}")))?;

        Ok(NoteDetail {
            language,
            reference_number: slug.to_string(),
            document,
            back_url: back_url(language, referer),
        })
    }
}

/// Where the detail page links back to: the referring page, unless that was
/// another detail page.
fn back_url(language: Language, referer: Option<&str>) -> String {
    match referer {
        Some(url) if !url.is_empty() && !url.contains("/qp/id/") => url.to_string(),
        _ => format!("/{language}/qp/"),
    }
}

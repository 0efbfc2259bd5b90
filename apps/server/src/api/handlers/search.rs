//! Search page handler
//!
//! `GET /{lang}/qp/?search_text=..&qp-search-year=2020|2021&sort=..&page=..`

use axum::{extract::State, Json};
use qpnotes_query::SearchRequest;

use crate::{
    api::extractors::{Lang, QueryPairs},
    services::SearchPage,
    state::AppState,
    Result,
};

pub async fn search(
    State(state): State<AppState>,
    Lang(language): Lang,
    pairs: QueryPairs,
) -> Result<Json<SearchPage>> {
    let request = SearchRequest::from_pairs(language, &pairs.0);
    let page = state
        .search_service
        .search(&request, &pairs.encode())
        .await?;
    Ok(Json(page))
}

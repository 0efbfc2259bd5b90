//! Note detail handler: `GET /{lang}/qp/id/{slug}`

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    Json,
};
use serde::Deserialize;

use crate::{api::extractors::Lang, services::NoteDetail, state::AppState, Result};

#[derive(Debug, Deserialize)]
pub struct NotePath {
    slug: String,
}

pub async fn detail(
    State(state): State<AppState>,
    Lang(language): Lang,
    Path(NotePath { slug }): Path<NotePath>,
    headers: HeaderMap,
) -> Result<Json<NoteDetail>> {
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok());
    let detail = state
        .search_service
        .detail(language, &slug, referer)
        .await?;
    Ok(Json(detail))
}

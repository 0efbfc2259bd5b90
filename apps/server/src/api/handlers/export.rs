//! CSV export handler
//!
//! `GET /{lang}/qp/export/` takes the same parameters as the search page and
//! answers with the CSV file itself, or a redirect to its published copy.

use std::time::SystemTime;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::{DateTime, Utc};
use qpnotes_query::SearchRequest;

use crate::{
    api::extractors::{Lang, QueryPairs},
    request_context::RequestContext,
    services::ExportDelivery,
    state::AppState,
    Result,
};

pub async fn export(
    State(state): State<AppState>,
    Lang(language): Lang,
    QueryPairs(pairs): QueryPairs,
    context: Option<Extension<RequestContext>>,
) -> Result<Response> {
    let request = SearchRequest::from_pairs(language, &pairs);
    let delivery = state.export_service.export(&request, &pairs).await?;

    let request_id = context.as_ref().map(|Extension(ctx)| ctx.request_id.as_str());
    let elapsed_ms = context.as_ref().map(|Extension(ctx)| ctx.elapsed_ms());

    match delivery {
        ExportDelivery::Redirect(location) => {
            tracing::info!(?request_id, ?elapsed_ms, location = %location, "Redirecting to published export");
            Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
        }
        ExportDelivery::File(entry) => {
            let body = tokio::fs::read(&entry.path).await?;
            tracing::info!(?request_id, ?elapsed_ms, key = %entry.key, bytes = body.len(), "Sending export file");
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}.csv\"", entry.key),
                    ),
                    (header::LAST_MODIFIED, http_date(entry.modified)),
                ],
                body,
            )
                .into_response())
        }
    }
}

/// IMF-fixdate, as used by `Last-Modified`.
fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

//! Business logic layer
//!
//! Services sit between the HTTP handlers and the search backend:
//! - `search`: interactive search pages and note details
//! - `export`: CSV exports and their on-disk cache

pub mod export;
pub mod search;

pub use export::{ExportCache, ExportDelivery, ExportService};
pub use search::{FacetGroup, NoteDetail, SearchPage, SearchService};

use std::time::Instant;

use qpnotes_query::SelectResponse;
use qpnotes_solr::{SearchBackend, SearchBackendError};

use crate::metrics::{SOLR_QUERY_DURATION_SECONDS, SOLR_QUERY_FAILURES_TOTAL};
use crate::Result;

/// Run one select call, recording its duration and failures under `operation`.
pub(crate) async fn timed_select(
    backend: &dyn SearchBackend,
    operation: &'static str,
    params: &[(String, String)],
) -> Result<SelectResponse> {
    let start = Instant::now();
    let result = backend.select(params).await;
    SOLR_QUERY_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(start.elapsed().as_secs_f64());

    result.map_err(|err| {
        let kind = match &err {
            SearchBackendError::Unreachable(_) => "unreachable",
            SearchBackendError::Status { .. } => "status",
            SearchBackendError::Malformed(_) => "malformed",
            SearchBackendError::Config(_) => "config",
        };
        SOLR_QUERY_FAILURES_TOTAL
            .with_label_values(&[operation, kind])
            .inc();
        tracing::warn!(operation, kind, error = %err, "Select call failed");
        err.into()
    })
}

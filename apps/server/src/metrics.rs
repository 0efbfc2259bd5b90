//! Metrics collection for the search server
//!
//! This module defines the Prometheus metrics exposed on `/metrics`.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use qpnotes_query::Language;

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "qp_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "qp_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    /// In-flight HTTP requests
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "qp_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    // Search Engine Metrics

    /// Select call duration by operation (search, detail, export)
    pub static ref SOLR_QUERY_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "qp_solr_query_duration_seconds",
        "Search engine select call duration in seconds",
        &["operation"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to register SOLR_QUERY_DURATION_SECONDS");

    /// Failed select calls by operation and failure kind
    pub static ref SOLR_QUERY_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "qp_solr_query_failures_total",
        "Total number of failed search engine select calls",
        &["operation", "kind"]
    )
    .expect("Failed to register SOLR_QUERY_FAILURES_TOTAL");

    // Export Metrics

    /// Export cache lookups by outcome (hit, miss, stale)
    pub static ref EXPORT_CACHE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "qp_export_cache_total",
        "Export cache lookups by outcome",
        &["outcome"]
    )
    .expect("Failed to register EXPORT_CACHE_TOTAL");

    /// Rows written per generated export
    pub static ref EXPORT_ROWS: HistogramVec = register_histogram_vec!(
        "qp_export_rows",
        "Number of rows written to a generated export",
        &["language"],
        vec![0.0, 10.0, 100.0, 1_000.0, 5_000.0, 10_000.0, 50_000.0]
    )
    .expect("Failed to register EXPORT_ROWS");
}

/// Collapse a request path to its route template to keep label cardinality low.
pub fn sanitize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => "/".to_string(),
        [single] if matches!(*single, "health" | "metrics" | "favicon.ico") => format!("/{single}"),
        [lang, "qp", rest @ ..] => {
            let Ok(lang) = lang.parse::<Language>() else {
                return "/other".to_string();
            };
            match rest {
                [] => format!("/{lang}/qp"),
                ["export"] => format!("/{lang}/qp/export"),
                ["id", _] => format!("/{lang}/qp/id/{{slug}}"),
                _ => "/other".to_string(),
            }
        }
        _ => "/other".to_string(),
    }
}

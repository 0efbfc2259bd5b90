//! Search engine select-handler client

use std::time::Duration;

use async_trait::async_trait;
use qpnotes_query::SelectResponse;
use reqwest::Client;
use url::Url;

use crate::error::{Result, SearchBackendError};
use crate::SearchBackend;

/// Longest slice of an error body carried into [`SearchBackendError::Status`].
const BODY_EXCERPT_LEN: usize = 512;

/// Client for one engine core, e.g. `http://localhost:8983/solr/core_qp`.
#[derive(Debug, Clone)]
pub struct SolrClient {
    client: Client,
    select_url: Url,
}

impl SolrClient {
    pub fn new(core_url: &str, timeout: Duration) -> Result<Self> {
        let select_url = select_url(core_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, select_url })
    }

    pub fn select_url(&self) -> &Url {
        &self.select_url
    }
}

#[async_trait]
impl SearchBackend for SolrClient {
    async fn select(&self, params: &[(String, String)]) -> Result<SelectResponse> {
        tracing::debug!(url = %self.select_url, params = params.len(), "Sending select query");

        let response = self
            .client
            .get(self.select_url.clone())
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchBackendError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        parse_select(&body)
    }
}

fn select_url(core_url: &str) -> Result<Url> {
    let trimmed = core_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(SearchBackendError::Config("search engine URL is empty".to_string()));
    }
    Url::parse(&format!("{trimmed}/select"))
        .map_err(|e| SearchBackendError::Config(format!("invalid search engine URL {core_url:?}: {e}")))
}

/// Decode a `wt=json` select response body.
pub fn parse_select(body: &str) -> Result<SelectResponse> {
    Ok(serde_json::from_str(body)?)
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn select_url_appends_handler() {
        let url = select_url("http://localhost:8983/solr/core_qp/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8983/solr/core_qp/select");
        let url = select_url("http://solr:8983/solr/qp").unwrap();
        assert_eq!(url.path(), "/solr/qp/select");
    }

    #[test]
    fn bad_urls_are_configuration_errors() {
        assert!(matches!(select_url("  "), Err(SearchBackendError::Config(_))));
        assert!(matches!(select_url("not a url"), Err(SearchBackendError::Config(_))));
    }

    #[test]
    fn parse_select_reads_engine_output() {
        let body = r#"{
            "responseHeader": {"status": 0},
            "response": {"numFound": 1, "start": 0, "docs": [{"id": "qp-1"}]},
            "facet_counts": {"facet_fields": {"year_i": [2021, 1]}}
        }"#;
        let parsed = parse_select(body).unwrap();
        assert_eq!(parsed.hits(), 1);
        assert_eq!(parsed.facet_list("year_i").len(), 2);
    }

    #[test]
    fn parse_select_rejects_garbage() {
        let err = parse_select("<html>oops</html>").unwrap_err();
        assert!(matches!(err, SearchBackendError::Malformed(_)));
        let err = parse_select(r#"{"responseHeader": {}}"#).unwrap_err();
        assert!(err.to_string().contains("response"));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "é".repeat(BODY_EXCERPT_LEN + 10);
        let short = excerpt(&body);
        assert_eq!(short.chars().count(), BODY_EXCERPT_LEN + 3);
        assert!(short.ends_with("..."));
        assert_eq!(excerpt("tiny"), "tiny");
    }

    struct Canned(&'static str);

    #[async_trait]
    impl SearchBackend for Canned {
        async fn select(&self, _params: &[(String, String)]) -> Result<SelectResponse> {
            parse_select(self.0)
        }
    }

    #[tokio::test]
    async fn backends_work_as_trait_objects() {
        let backend: Arc<dyn SearchBackend> =
            Arc::new(Canned(r#"{"response": {"numFound": 3, "docs": []}}"#));
        let response = backend.select(&[]).await.unwrap();
        assert_eq!(response.hits(), 3);
    }
}

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use qpnotes::{api::create_router, AppState, Config};
use qpnotes_query::SelectResponse;
use qpnotes_solr::{SearchBackend, SearchBackendError};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt as _;

type Responder =
    dyn Fn(&[(String, String)]) -> Result<SelectResponse, SearchBackendError> + Send + Sync;

/// In-memory search engine that records every select call it receives.
pub struct FakeBackend {
    respond: Box<Responder>,
    calls: Mutex<Vec<Vec<(String, String)>>>,
}

impl FakeBackend {
    pub fn new(
        respond: impl Fn(&[(String, String)]) -> Result<SelectResponse, SearchBackendError>
            + Send
            + Sync
            + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Answer every call with the same engine output.
    pub fn returning(body: Value) -> Arc<Self> {
        Self::new(move |_| Ok(select_response(body.clone())))
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Self::new(move |_| {
            Err(SearchBackendError::Status {
                status,
                body: "engine exploded".to_string(),
            })
        })
    }

    pub fn calls(&self) -> Vec<Vec<(String, String)>> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn select(&self, params: &[(String, String)]) -> qpnotes_solr::Result<SelectResponse> {
        self.calls.lock().expect("calls lock").push(params.to_vec());
        (self.respond)(params)
    }
}

pub fn select_response(body: Value) -> SelectResponse {
    serde_json::from_value(body).expect("valid select response fixture")
}

/// All values of `name` in one recorded call.
pub fn param<'a>(call: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    call.iter()
        .filter(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .collect()
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub backend: Arc<FakeBackend>,
    cache_dir: TempDir,
}

impl TestApp {
    pub fn new(backend: Arc<FakeBackend>) -> anyhow::Result<Self> {
        Self::new_with_config(backend, |_| {})
    }

    pub fn new_with_config(
        backend: Arc<FakeBackend>,
        configure: impl FnOnce(&mut Config),
    ) -> anyhow::Result<Self> {
        let cache_dir = tempfile::tempdir().context("create export cache dir")?;

        let mut config = Config::default();
        config.export.cache_dir = cache_dir.path().join("exports");
        configure(&mut config);

        let state = AppState::with_backend(config, backend.clone()).context("initialize AppState")?;
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            backend,
            cache_dir,
        })
    }

    /// Files currently in the export cache directory.
    pub fn cached_files(&self) -> anyhow::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(self.state.export_service.cache().dir())? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    pub async fn get(&self, path_and_query: &str) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.get_with_headers(path_and_query, &[]).await
    }

    pub async fn get_with_headers(
        &self,
        path_and_query: &str,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut request = Request::builder()
            .method(Method::GET)
            .uri(path_and_query)
            .header("host", "example.org")
            .body(Body::empty())
            .context("build request")?;

        for (name, value) in extra_headers {
            request.headers_mut().insert(
                name.parse::<HeaderName>().context("parse header name")?,
                value.parse::<HeaderValue>().context("parse header value")?,
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok((status, headers, body))
    }

    pub async fn get_json(&self, path_and_query: &str) -> anyhow::Result<(StatusCode, Value)> {
        let (status, _headers, body) = self.get(path_and_query).await?;
        let value = serde_json::from_slice(&body).context("parse JSON body")?;
        Ok((status, value))
    }
}

/// Assert status code matches expected
pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(
        actual, expected,
        "{context}: expected status {expected}, got {actual}"
    );
}

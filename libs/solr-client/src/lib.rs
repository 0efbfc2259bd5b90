//! HTTP client for the search engine's `select` handler.
//!
//! The server talks to the engine through the [`SearchBackend`] trait so the
//! handlers can be exercised against an in-memory backend in tests.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use qpnotes_query::{Language, QueryPlan, SearchRequest};
//! use qpnotes_solr::{SearchBackend, SolrClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SolrClient::new("http://localhost:8983/solr/core_qp", Duration::from_secs(10))?;
//! let plan = QueryPlan::search(&SearchRequest::new(Language::En), 10);
//! let response = client.select(&plan.to_params()).await?;
//! println!("{} notes", response.hits());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;

use async_trait::async_trait;
use qpnotes_query::SelectResponse;

pub use client::SolrClient;
pub use error::{Result, SearchBackendError};

/// A search engine that answers select queries.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one select call with already encoded parameters.
    async fn select(&self, params: &[(String, String)]) -> Result<SelectResponse>;
}

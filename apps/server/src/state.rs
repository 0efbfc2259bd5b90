//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use qpnotes_solr::{SearchBackend, SolrClient};

use crate::config::Config;
use crate::services::{ExportCache, ExportService, SearchService};
use crate::{Error, Result};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub search_service: Arc<SearchService>,
    pub export_service: Arc<ExportService>,
}

impl AppState {
    /// Build state against the configured search engine.
    pub async fn new(config: Config) -> Result<Self> {
        let client = SolrClient::new(
            &config.solr.url,
            Duration::from_secs(config.solr.timeout_seconds),
        )?;
        tracing::info!(url = %client.select_url(), "Search engine client ready");
        Self::with_backend(config, Arc::new(client))
    }

    /// Build state around any backend. Creates the export cache directory.
    pub fn with_backend(config: Config, backend: Arc<dyn SearchBackend>) -> Result<Self> {
        let cache = ExportCache::new(
            config.export.cache_dir.clone(),
            Duration::from_secs(config.export.max_age_seconds),
        );
        cache.create_dir().map_err(|e| {
            Error::Internal(format!(
                "failed to create export cache directory {}: {e}",
                cache.dir().display()
            ))
        })?;

        let search_service = SearchService::new(
            backend.clone(),
            config.search.items_per_page,
            config.search.year_facet_descending,
        );
        let export_service = ExportService::new(
            backend,
            cache,
            config.export.batch_size,
            config.export.public_url.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            search_service: Arc::new(search_service),
            export_service: Arc::new(export_service),
        })
    }
}

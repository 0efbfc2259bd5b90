//! Server configuration
//!
//! Values are layered, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. `config.toml` in the working directory, or the file given with `--config`
//! 3. Environment variables prefixed with `QP`, sections separated by `__`
//!    (`QP__SOLR__URL`, `QP__EXPORT__PUBLIC_URL`, ...)
//!
//! A `.env` file is loaded into the environment before the sources are read.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "QP";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub solr: SolrConfig,
    pub search: SearchConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means no CORS headers are sent.
    pub cors_origins: Vec<String>,
    pub max_request_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
            max_request_body_size: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolrConfig {
    /// Core URL, without the `/select` handler.
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8983/solr/core_qp".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub items_per_page: u64,
    /// List year facet values newest first instead of in index order.
    pub year_facet_descending: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            items_per_page: 10,
            year_facet_descending: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub cache_dir: PathBuf,
    /// Age after which a cached export is regenerated.
    pub max_age_seconds: u64,
    /// Base URL the cache directory is published under. Empty serves files directly.
    pub public_url: String,
    /// Rows fetched per cursor page while generating an export.
    pub batch_size: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache/qp_exports"),
            max_age_seconds: 600,
            public_url: String::new(),
            batch_size: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// `daily`, `hourly`, `minutely` or `never`.
    pub file_rotation: String,
    pub service_name: String,
    pub service_version: Option<String>,
    pub deployment_environment: String,
    pub opentelemetry_enabled: bool,
    pub otlp_endpoint: String,
    pub otlp_timeout_seconds: u64,
    pub trace_sample_ratio: f64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "qp-server".to_string(),
            file_rotation: "daily".to_string(),
            service_name: "qp-server".to_string(),
            service_version: None,
            deployment_environment: "development".to_string(),
            opentelemetry_enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            otlp_timeout_seconds: 10,
            trace_sample_ratio: 1.0,
        }
    }
}

impl Config {
    /// Load from `config.toml` (if present) and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load with an explicit config file, which must then exist.
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.solr.url.trim().is_empty() {
            return Err("solr.url must not be empty".to_string());
        }
        if self.search.items_per_page == 0 {
            return Err("search.items_per_page must be at least 1".to_string());
        }
        if self.export.batch_size == 0 {
            return Err("export.batch_size must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.logging.trace_sample_ratio) {
            return Err(format!(
                "logging.trace_sample_ratio must be between 0.0 and 1.0, got {}",
                self.logging.trace_sample_ratio
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

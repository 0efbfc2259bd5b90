//! Export service - CSV exports backed by an on-disk cache
//!
//! An export holds every note matching the request's terms and filters, in id
//! order. Generated files are cached under a key derived from the request
//! parameters and reused until they are older than the freshness window.
//! Staleness is checked when an entry is looked up; nothing sweeps the
//! directory in the background.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use qpnotes_query::{Document, Language, QueryPlan, SearchRequest};
use qpnotes_solr::SearchBackend;
use serde_json::Value;
use sha2::{Digest, Sha256};
use url::form_urlencoded;

use crate::metrics::{EXPORT_CACHE_TOTAL, EXPORT_ROWS};
use crate::services::timed_select;
use crate::{Error, Result};

/// Cursor mark that starts a deep-paged scan.
const CURSOR_START: &str = "*";

/// Separator between the values of a multi-valued field in one CSV cell.
const MULTI_VALUE_SEPARATOR: &str = "; ";

/// A generated export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Fresh(CacheEntry),
    /// An entry existed but was too old and has been removed.
    Stale,
    Missing,
}

#[derive(Debug, Clone)]
pub struct ExportCache {
    dir: PathBuf,
    max_age: Duration,
}

impl ExportCache {
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            dir: dir.into(),
            max_age,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn create_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Cache key for a request: hex SHA-256 of its canonical query string.
    ///
    /// The language leads the canonical form, followed by the request pairs
    /// sorted by name. Repeated names keep their relative order.
    pub fn key(language: Language, pairs: &[(String, String)]) -> String {
        let mut sorted: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let canonical = form_urlencoded::Serializer::new(String::new())
            .append_pair("lang", language.code())
            .extend_pairs(sorted)
            .finish();
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.csv"))
    }

    pub fn lookup(&self, key: &str) -> io::Result<CacheLookup> {
        self.lookup_at(key, SystemTime::now())
    }

    pub(crate) fn lookup_at(&self, key: &str, now: SystemTime) -> io::Result<CacheLookup> {
        let path = self.entry_path(key);
        let modified = match fs::metadata(&path) {
            Ok(metadata) => metadata.modified()?,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CacheLookup::Missing),
            Err(e) => return Err(e),
        };

        // A clock step backwards makes the entry look fresh.
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age > self.max_age {
            match fs::remove_file(&path) {
                Ok(()) => {}
                // Another request already removed it.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
            return Ok(CacheLookup::Stale);
        }

        Ok(CacheLookup::Fresh(CacheEntry {
            key: key.to_string(),
            path,
            modified,
        }))
    }

    /// Write an export under `key`. Readers only ever see a complete file: rows
    /// go to a temporary file in the cache directory which is then renamed over
    /// the entry path.
    pub fn store(&self, key: &str, header: &[String], rows: &[Vec<String>]) -> Result<CacheEntry> {
        let path = self.entry_path(key);
        let temp = tempfile::Builder::new()
            .prefix(".export-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;

        let mut writer = csv::Writer::from_writer(temp);
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        let temp = writer
            .into_inner()
            .map_err(|e| Error::Export(format!("failed to finish export file: {e}")))?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| e.error)?;

        let modified = fs::metadata(&path)?.modified()?;
        Ok(CacheEntry {
            key: key.to_string(),
            path,
            modified,
        })
    }
}

/// How an export reaches the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDelivery {
    /// Send the file itself.
    File(CacheEntry),
    /// Redirect to where the cache directory is published.
    Redirect(String),
}

pub struct ExportService {
    backend: Arc<dyn SearchBackend>,
    cache: ExportCache,
    batch_size: u64,
    public_url: String,
}

impl ExportService {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        cache: ExportCache,
        batch_size: u64,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            cache,
            batch_size,
            public_url: public_url.into(),
        }
    }

    pub fn cache(&self) -> &ExportCache {
        &self.cache
    }

    /// Serve the export for `request`, generating it unless a fresh one is cached.
    /// `pairs` are the raw request parameters the cache key is derived from.
    pub async fn export(
        &self,
        request: &SearchRequest,
        pairs: &[(String, String)],
    ) -> Result<ExportDelivery> {
        let key = ExportCache::key(request.language, pairs);

        let cache = self.cache.clone();
        let lookup_key = key.clone();
        let lookup = tokio::task::spawn_blocking(move || cache.lookup(&lookup_key))
            .await
            .map_err(|e| Error::Internal(format!("export cache lookup task failed: {e}")))??;

        let entry = match lookup {
            CacheLookup::Fresh(entry) => {
                EXPORT_CACHE_TOTAL.with_label_values(&["hit"]).inc();
                tracing::info!(key = %key, "Serving cached export");
                entry
            }
            lookup => {
                let outcome = if lookup == CacheLookup::Stale {
                    "stale"
                } else {
                    "miss"
                };
                EXPORT_CACHE_TOTAL.with_label_values(&[outcome]).inc();
                tracing::info!(key = %key, outcome, "Generating export");
                self.generate(request, &key).await?
            }
        };

        Ok(self.deliver(entry))
    }

    fn deliver(&self, entry: CacheEntry) -> ExportDelivery {
        if self.public_url.is_empty() {
            ExportDelivery::File(entry)
        } else {
            ExportDelivery::Redirect(format!("{}{}.csv", self.public_url, entry.key))
        }
    }

    async fn generate(&self, request: &SearchRequest, key: &str) -> Result<CacheEntry> {
        let (header, rows) = self.fetch_rows(request).await?;
        EXPORT_ROWS
            .with_label_values(&[request.language.code()])
            .observe(rows.len() as f64);

        let cache = self.cache.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || cache.store(&key, &header, &rows))
            .await
            .map_err(|e| Error::Internal(format!("export writer task failed: {e}")))?
    }

    /// Pull every matching document by walking the engine cursor until it
    /// stops advancing.
    async fn fetch_rows(&self, request: &SearchRequest) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let mut plan = QueryPlan::export(request, self.batch_size, CURSOR_START);
        let mut cursor = CURSOR_START.to_string();
        let mut rows = Vec::new();

        loop {
            let response = timed_select(self.backend.as_ref(), "export", &plan.to_params()).await?;
            let fetched = response.docs().len();
            rows.extend(response.docs().iter().map(|doc| csv_row(doc, &plan.fields)));

            let next = response.next_cursor_mark.ok_or_else(|| {
                Error::Export("search engine response carried no cursor mark".to_string())
            })?;
            if next == cursor || fetched == 0 {
                break;
            }
            plan.advance_cursor(&next);
            cursor = next;
        }

        tracing::debug!(rows = rows.len(), "Fetched export rows");
        Ok((plan.fields, rows))
    }
}

/// One CSV row: a cell per field, in field order.
fn csv_row(doc: &Document, fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .map(|field| doc.get(field).map(cell).unwrap_or_default())
        .collect()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(values) => values
            .iter()
            .map(cell)
            .collect::<Vec<_>>()
            .join(MULTI_VALUE_SEPARATOR),
        other => other.to_string(),
    }
}

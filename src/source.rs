//! Where the catalog comes from.
//!
//! The catalog is a single JSON document (see [`crate::models`]). It is
//! either fetched over HTTP or read from disk, and normally wrapped in a
//! [`CachedSource`] so it is loaded once and shared.
//!
//! # Sources
//!
//! | Type | Backing |
//! |------|---------|
//! | [`HttpSource`] | `GET` a URL with an overall deadline |
//! | [`FileSource`] | A local JSON file |
//! | [`StaticSource`] | An already-built [`Catalog`] |
//! | [`CachedSource`] | Wraps another source; keeps the last good copy |
//!
//! # Stale fallback
//!
//! When a cached copy has expired and the reload fails, the stale copy is
//! served and the failure is logged. With nothing cached the error goes to
//! the caller.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::models::Catalog;

/// A provider of the full catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    /// Produce the whole catalog.
    async fn load(&self) -> Result<Arc<Catalog>, SourceError>;

    /// When the catalog was last successfully loaded, if tracked.
    async fn last_loaded(&self) -> Option<DateTime<Utc>> {
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════
// HTTP
// ═══════════════════════════════════════════════════════════════════════

pub struct HttpSource {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http {
                url: url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            url,
            timeout,
            client,
        })
    }

    fn map_err(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout {
                url: self.url.clone(),
                secs: self.timeout.as_secs(),
            }
        } else {
            SourceError::Http {
                url: self.url.clone(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn load(&self) -> Result<Arc<Catalog>, SourceError> {
        tracing::debug!(url = %self.url, "fetching catalog");

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| self.map_err(e))?;
        let catalog = Catalog::from_json(&body)?;
        tracing::info!(url = %self.url, events = catalog.len(), "catalog fetched");
        Ok(Arc::new(catalog))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// File
// ═══════════════════════════════════════════════════════════════════════

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Arc<Catalog>, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        let catalog = Catalog::from_json(&text)?;
        tracing::info!(path = %self.path.display(), events = catalog.len(), "catalog read");
        Ok(Arc::new(catalog))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Static
// ═══════════════════════════════════════════════════════════════════════

/// A fixed, in-memory catalog.
pub struct StaticSource {
    catalog: Arc<Catalog>,
}

impl StaticSource {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    fn describe(&self) -> String {
        "static".to_string()
    }

    async fn load(&self) -> Result<Arc<Catalog>, SourceError> {
        Ok(self.catalog.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Cache
// ═══════════════════════════════════════════════════════════════════════

struct CacheEntry {
    catalog: Arc<Catalog>,
    loaded: Instant,
    loaded_at: DateTime<Utc>,
}

/// Load-once wrapper with optional expiry and stale fallback.
pub struct CachedSource<S> {
    inner: S,
    ttl: Option<Duration>,
    entry: RwLock<Option<CacheEntry>>,
}

impl<S: CatalogSource> CachedSource<S> {
    /// `ttl = None` keeps the first successful load forever.
    pub fn new(inner: S, ttl: Option<Duration>) -> Self {
        Self {
            inner,
            ttl,
            entry: RwLock::new(None),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        match self.ttl {
            Some(ttl) => entry.loaded.elapsed() < ttl,
            None => true,
        }
    }
}

#[async_trait]
impl<S: CatalogSource> CatalogSource for CachedSource<S> {
    fn describe(&self) -> String {
        format!("cached({})", self.inner.describe())
    }

    async fn load(&self) -> Result<Arc<Catalog>, SourceError> {
        {
            let guard = self.entry.read().await;
            if let Some(entry) = guard.as_ref().filter(|e| self.is_fresh(e)) {
                return Ok(entry.catalog.clone());
            }
        }

        let mut guard = self.entry.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(entry) = guard.as_ref().filter(|e| self.is_fresh(e)) {
            return Ok(entry.catalog.clone());
        }

        match self.inner.load().await {
            Ok(catalog) => {
                *guard = Some(CacheEntry {
                    catalog: catalog.clone(),
                    loaded: Instant::now(),
                    loaded_at: Utc::now(),
                });
                Ok(catalog)
            }
            Err(err) => match guard.as_mut() {
                Some(stale) => {
                    tracing::warn!(
                        source = %self.inner.describe(),
                        error = %err,
                        "catalog refresh failed, serving stale copy"
                    );
                    // Next attempt waits a full TTL; `loaded_at` keeps the last good load.
                    stale.loaded = Instant::now();
                    Ok(stale.catalog.clone())
                }
                None => Err(err),
            },
        }
    }

    async fn last_loaded(&self) -> Option<DateTime<Utc>> {
        self.entry.read().await.as_ref().map(|e| e.loaded_at)
    }
}

/// Build the configured source, wrapped in a cache.
pub fn from_config(config: &SourceConfig) -> anyhow::Result<Arc<dyn CatalogSource>> {
    let ttl = config.cache_ttl_secs.map(Duration::from_secs);
    let source: Arc<dyn CatalogSource> = match (&config.url, &config.path) {
        (Some(url), _) => {
            let http = HttpSource::new(url.clone(), Duration::from_secs(config.timeout_secs))?;
            Arc::new(CachedSource::new(http, ttl))
        }
        (None, Some(path)) => Arc::new(CachedSource::new(FileSource::new(path.clone()), ttl)),
        (None, None) => anyhow::bail!("no catalog source configured"),
    };
    Ok(source)
}

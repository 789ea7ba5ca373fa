//! Session-scoped catalog cache.
//!
//! The catalog is loaded lazily on first use, shared as an immutable
//! `Arc<FrameCatalog>`, and reloaded only after its time-to-live elapses or
//! after an explicit [`CatalogCache::invalidate`].

use crate::catalog::FrameCatalog;
use crate::trace::{trace_event, trace_span};
use crate::util::{FrameFitError, FrameFitResult};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Source of catalog data.
pub trait CatalogLoader {
    /// Produces a fresh catalog.
    fn load(&self) -> FrameFitResult<FrameCatalog>;
}

impl<F> CatalogLoader for F
where
    F: Fn() -> FrameFitResult<FrameCatalog>,
{
    fn load(&self) -> FrameFitResult<FrameCatalog> {
        self()
    }
}

/// Loads a frame-mapping JSON document from disk.
#[derive(Clone, Debug)]
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    /// Creates a loader for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogLoader for JsonFileLoader {
    fn load(&self) -> FrameFitResult<FrameCatalog> {
        let text = fs::read_to_string(&self.path).map_err(|err| FrameFitError::InvalidCatalog {
            reason: format!("{}: {err}", self.path.display()),
        })?;
        FrameCatalog::from_json_str(&text)
    }
}

struct Loaded {
    catalog: Arc<FrameCatalog>,
    loaded_at: Instant,
}

/// Lazily loaded, explicitly invalidated catalog holder.
pub struct CatalogCache<L> {
    loader: L,
    ttl: Option<Duration>,
    slot: RwLock<Option<Loaded>>,
}

impl<L: CatalogLoader> CatalogCache<L> {
    /// Creates an empty cache whose catalog never expires.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            ttl: None,
            slot: RwLock::new(None),
        }
    }

    /// Sets the time-to-live after which the next `get` reloads.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Returns the current catalog, loading it if missing or expired.
    ///
    /// A failed load is returned to the caller and leaves the previously
    /// cached catalog untouched.
    pub fn get(&self) -> FrameFitResult<Arc<FrameCatalog>> {
        {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(loaded) = slot.as_ref().filter(|l| !self.is_expired(l)) {
                return Ok(Arc::clone(&loaded.catalog));
            }
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have reloaded while we waited for the write lock.
        if let Some(loaded) = slot.as_ref().filter(|l| !self.is_expired(l)) {
            return Ok(Arc::clone(&loaded.catalog));
        }

        let _span = trace_span!("catalog_reload").entered();
        let catalog = Arc::new(self.loader.load()?);
        trace_event!("catalog_cached", frames = catalog.len());
        *slot = Some(Loaded {
            catalog: Arc::clone(&catalog),
            loaded_at: Instant::now(),
        });
        Ok(catalog)
    }

    /// Returns the cached catalog without loading, even if expired.
    pub fn cached(&self) -> Option<Arc<FrameCatalog>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(|loaded| Arc::clone(&loaded.catalog))
    }

    /// Forces the next `get` to reload.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    fn is_expired(&self, loaded: &Loaded) -> bool {
        self.ttl
            .is_some_and(|ttl| loaded.loaded_at.elapsed() >= ttl)
    }
}

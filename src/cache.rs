//! Identity cache: one metadata store per identity
//!
//! DashMap holds one slot per identity; each slot is a `OnceCell`, so the
//! first caller for an identity runs the loader while concurrent callers for
//! the same identity wait on that cell instead of loading again. Callers for
//! other identities are never blocked by a load in progress.
//!
//! A failed load is not kept: its slot is dropped unless another caller is
//! already waiting on it, so the next access retries and unknown identities
//! do not accumulate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::MetadataError;
use crate::identity::Identity;
use crate::store::MetadataStore;

type Slot = Arc<OnceCell<Arc<MetadataStore>>>;

/// Counters for cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from an existing store
    pub hits: usize,
    /// Successful loads
    pub loads: usize,
    /// Loads that returned an error
    pub failures: usize,
}

/// Process-wide table of identity → metadata store
#[derive(Default)]
pub struct MetadataCache {
    slots: DashMap<Identity, Slot>,
    hits: AtomicUsize,
    loads: AtomicUsize,
    failures: AtomicUsize,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the store for `identity`, running `load` only if none exists yet
    ///
    /// At most one `load` runs per identity at a time; a successful result is
    /// kept for the lifetime of the cache, an error is returned and forgotten.
    pub fn get_or_load<F>(&self, identity: &Identity, load: F) -> Result<Arc<MetadataStore>, MetadataError>
    where
        F: FnOnce() -> Result<MetadataStore, MetadataError>,
    {
        // Fast path: already loaded
        if let Some(store) = self
            .slots
            .get(identity)
            .and_then(|slot| slot.value().get().cloned())
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(store);
        }

        // Entry API for atomic get-or-insert of the slot; the shard lock is
        // released before loading
        let slot: Slot = Arc::clone(self.slots.entry(identity.clone()).or_default().value());

        let mut ran = false;
        let result = slot.get_or_try_init(|| {
            ran = true;
            load().map(Arc::new)
        });

        match result {
            Ok(store) if ran => {
                self.loads.fetch_add(1, Ordering::Relaxed);
                debug!(%identity, entries = store.get_metadata().len(), "Loaded metadata bundle");
                Ok(Arc::clone(store))
            }
            Ok(store) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Arc::clone(store))
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                // Two handles: the map's and ours. More means a waiter will retry on it.
                self.slots
                    .remove_if(identity, |_, s| s.get().is_none() && Arc::strong_count(s) == 2);
                warn!(%identity, error = %err, "Metadata bundle load failed");
                Err(err)
            }
        }
    }

    /// Whether a store for `identity` has been loaded
    pub fn contains(&self, identity: &Identity) -> bool {
        self.slots
            .get(identity)
            .is_some_and(|slot| slot.value().get().is_some())
    }

    /// Number of loaded stores
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("loaded", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

//! Mock provider for testing
//!
//! Serves configurable bundles, records every load and can simulate
//! transient failures. Essential for cache and concurrency tests.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::BundleProvider;
use crate::bundle::Bundle;
use crate::error::MetadataError;
use crate::identity::Identity;

/// Mock provider that returns predefined bundles
#[derive(Clone, Default)]
pub struct MockProvider {
    bundles: Arc<Mutex<FxHashMap<Identity, Bundle>>>,
    /// Number of upcoming loads that fail with `IdentityNotFound`
    failures: Arc<Mutex<usize>>,
    /// Artificial latency per load (widens race windows in tests)
    delay: Duration,
    /// Track all loads made (for assertions)
    loads: Arc<Mutex<Vec<Identity>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bundle (builder style)
    pub fn with_bundle(self, identity: Identity, bundle: Bundle) -> Self {
        self.bundles.lock().insert(identity, bundle);
        self
    }

    /// Sleep this long inside every load
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make the next `count` loads fail
    pub fn fail_next(&self, count: usize) {
        *self.failures.lock() = count;
    }

    /// Get all identities loaded so far
    pub fn loads(&self) -> Vec<Identity> {
        self.loads.lock().clone()
    }

    /// Number of loads for one identity
    pub fn load_count(&self, identity: &Identity) -> usize {
        self.loads.lock().iter().filter(|id| *id == identity).count()
    }
}

impl BundleProvider for MockProvider {
    fn load_bundle(&self, identity: &Identity) -> Result<Bundle, MetadataError> {
        self.loads.lock().push(identity.clone());

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        {
            let mut failures = self.failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(MetadataError::IdentityNotFound {
                    identity: identity.to_string(),
                });
            }
        }

        self.bundles
            .lock()
            .get(identity)
            .cloned()
            .ok_or_else(|| MetadataError::IdentityNotFound {
                identity: identity.to_string(),
            })
    }
}

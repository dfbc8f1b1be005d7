//! # Bundle Providers
//!
//! Where raw metadata bundles come from.
//!
//! ## Overview
//!
//! - [`BundleProvider`] - Core trait: identity in, bundle out
//! - [`StaticProvider`] - Fixed in-memory bundles
//! - [`ManifestFile`] - Bundles and resources parsed from a YAML/JSON manifest
//! - [`MockProvider`] - Test provider that records loads and simulates failures
//!
//! ## Available Providers
//!
//! | Provider | Use Case | Resources |
//! |----------|----------|-----------|
//! | `ManifestFile` | Production | Own [`ResourceTable`](crate::ResourceTable) |
//! | `StaticProvider` | Embedding | Caller-supplied resolver |
//! | `MockProvider` | Testing | Caller-supplied resolver |
//!
//! Providers are called at most once per identity by
//! [`MetadataCache`](crate::MetadataCache); a failed load is retried on the
//! next access.
//!
//! ```rust
//! use metabind::{Bundle, BundleProvider, Identity, StaticProvider};
//!
//! let app = Identity::application("com.example").unwrap();
//! let provider = StaticProvider::new()
//!     .with(app.clone(), Bundle::builder().int("metadata.integer", 42).build());
//!
//! assert_eq!(provider.load_bundle(&app).unwrap().len(), 1);
//!
//! let other = Identity::application("com.other").unwrap();
//! assert!(provider.load_bundle(&other).is_err());
//! ```

mod manifest;
mod mock;

pub use manifest::ManifestFile;
pub use mock::MockProvider;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::bundle::Bundle;
use crate::error::MetadataError;
use crate::identity::Identity;

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// Supplies the raw bundle for an identity
///
/// Implementations must report unknown identities as
/// [`MetadataError::IdentityNotFound`].
pub trait BundleProvider: Send + Sync {
    fn load_bundle(&self, identity: &Identity) -> Result<Bundle, MetadataError>;
}

impl<P: BundleProvider + ?Sized> BundleProvider for Arc<P> {
    fn load_bundle(&self, identity: &Identity) -> Result<Bundle, MetadataError> {
        (**self).load_bundle(identity)
    }
}

// ============================================================================
// STATIC PROVIDER
// ============================================================================

/// Provider over a fixed set of in-memory bundles
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    bundles: FxHashMap<Identity, Bundle>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bundle (builder style)
    pub fn with(mut self, identity: Identity, bundle: Bundle) -> Self {
        self.insert(identity, bundle);
        self
    }

    /// Add or replace the bundle for an identity
    pub fn insert(&mut self, identity: Identity, bundle: Bundle) {
        self.bundles.insert(identity, bundle);
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

impl BundleProvider for StaticProvider {
    fn load_bundle(&self, identity: &Identity) -> Result<Bundle, MetadataError> {
        self.bundles
            .get(identity)
            .cloned()
            .ok_or_else(|| MetadataError::IdentityNotFound {
                identity: identity.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_serves_registered_bundles() {
        let app = Identity::application("com.example").unwrap();
        let main = Identity::component("com.example", ".Main").unwrap();

        let provider = StaticProvider::new()
            .with(app.clone(), Bundle::builder().string("a", "1").build())
            .with(main.clone(), Bundle::builder().int("b", 2).int("c", 3).build());

        assert_eq!(provider.len(), 2);
        assert_eq!(provider.load_bundle(&app).unwrap().len(), 1);
        assert_eq!(provider.load_bundle(&main).unwrap().len(), 2);
    }

    #[test]
    fn static_provider_unknown_identity() {
        let provider = StaticProvider::new();
        let id = Identity::component("com.example", ".Missing").unwrap();

        let err = provider.load_bundle(&id).unwrap_err();
        assert!(matches!(err, MetadataError::IdentityNotFound { .. }));
        assert!(err.to_string().contains("com.example.Missing"));
    }

    #[test]
    fn provider_through_arc() {
        let app = Identity::application("com.example").unwrap();
        let provider: Arc<dyn BundleProvider> =
            Arc::new(StaticProvider::new().with(app.clone(), Bundle::empty()));
        assert!(provider.load_bundle(&app).unwrap().is_empty());
    }
}

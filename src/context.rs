//! Metadata context: provider, resolver, class registry and identity cache
//!
//! A [`MetadataContext`] can be passed around explicitly, or installed as the
//! process-wide context with [`init`] and torn down with [`shutdown`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::cache::MetadataCache;
use crate::class_registry::ClassRegistry;
use crate::config::MetadataConfig;
use crate::error::MetadataError;
use crate::identity::{validate_qualified_name, Identity};
use crate::provider::{BundleProvider, ManifestFile};
use crate::resource::{ResourceResolver, ResourceTable};
use crate::store::MetadataStore;

/// Process-wide context, absent until [`init`]
static GLOBAL: Lazy<RwLock<Option<Arc<MetadataContext>>>> = Lazy::new(|| RwLock::new(None));

/// Everything needed to turn an identity into a metadata store
pub struct MetadataContext {
    package: Arc<str>,
    provider: Arc<dyn BundleProvider>,
    resolver: Arc<dyn ResourceResolver>,
    classes: Arc<ClassRegistry>,
    cache: MetadataCache,
}

impl MetadataContext {
    pub fn builder(
        package: impl Into<String>,
        provider: impl BundleProvider + 'static,
    ) -> MetadataContextBuilder {
        MetadataContextBuilder {
            package: package.into(),
            provider: Arc::new(provider),
            resolver: Arc::new(ResourceTable::new()),
            classes: ClassRegistry::new(),
        }
    }

    /// Context over a parsed manifest, resolving against its own resources
    pub fn from_manifest(manifest: ManifestFile, classes: ClassRegistry) -> Self {
        let resolver: Arc<dyn ResourceResolver> = manifest.resources();
        Self {
            package: Arc::from(manifest.package()),
            provider: Arc::new(manifest),
            resolver,
            classes: Arc::new(classes),
            cache: MetadataCache::new(),
        }
    }

    /// Load the configured manifest file
    pub fn from_config(
        config: &MetadataConfig,
        classes: ClassRegistry,
    ) -> Result<Self, MetadataError> {
        let manifest = ManifestFile::from_path(&config.manifest_path)?;

        if let Some(expected) = &config.package {
            if manifest.package() != expected {
                return Err(MetadataError::ManifestParse {
                    origin: config.manifest_path.display().to_string(),
                    details: format!(
                        "declares package '{}', expected '{}'",
                        manifest.package(),
                        expected
                    ),
                });
            }
        }

        Ok(Self::from_manifest(manifest, classes))
    }

    /// Store for `identity`, loading its bundle on first access
    #[instrument(skip_all, fields(identity = %identity))]
    pub fn get(&self, identity: &Identity) -> Result<Arc<MetadataStore>, MetadataError> {
        self.cache.get_or_load(identity, || {
            let bundle = self.provider.load_bundle(identity)?;
            Ok(MetadataStore::new(
                identity.clone(),
                bundle,
                Arc::clone(&self.resolver),
                Arc::clone(&self.classes),
            ))
        })
    }

    /// Store for the application-level bundle
    pub fn application(&self) -> Result<Arc<MetadataStore>, MetadataError> {
        self.get(&Identity::application(&*self.package)?)
    }

    /// Store for a component of this package (`.Name` or fully qualified)
    pub fn component(&self, name: &str) -> Result<Arc<MetadataStore>, MetadataError> {
        self.get(&Identity::component(&*self.package, name)?)
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }
}

impl std::fmt::Debug for MetadataContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataContext")
            .field("package", &self.package)
            .field("classes", &self.classes.len())
            .field("cache", &self.cache)
            .finish()
    }
}

/// Builder for [`MetadataContext`]
pub struct MetadataContextBuilder {
    package: String,
    provider: Arc<dyn BundleProvider>,
    resolver: Arc<dyn ResourceResolver>,
    classes: ClassRegistry,
}

impl MetadataContextBuilder {
    /// Resolver for resource tokens (default: empty table)
    pub fn resolver(mut self, resolver: impl ResourceResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Types reachable from class-name values
    pub fn classes(mut self, classes: ClassRegistry) -> Self {
        self.classes = classes;
        self
    }

    pub fn build(self) -> Result<MetadataContext, MetadataError> {
        validate_qualified_name(&self.package)?;

        Ok(MetadataContext {
            package: Arc::from(self.package),
            provider: self.provider,
            resolver: self.resolver,
            classes: Arc::new(self.classes),
            cache: MetadataCache::new(),
        })
    }
}

// ============================================================================
// PROCESS-WIDE CONTEXT
// ============================================================================

/// Install `context` as the process-wide context
pub fn init(context: MetadataContext) -> Result<Arc<MetadataContext>, MetadataError> {
    let mut global = GLOBAL.write();
    if global.is_some() {
        return Err(MetadataError::AlreadyInitialized);
    }

    let context = Arc::new(context);
    debug!(package = %context.package, "Initialized metadata context");
    *global = Some(Arc::clone(&context));
    Ok(context)
}

/// The process-wide context installed by [`init`]
pub fn global() -> Result<Arc<MetadataContext>, MetadataError> {
    GLOBAL.read().clone().ok_or(MetadataError::NotInitialized)
}

/// Remove the process-wide context; its cache is dropped with the last handle
pub fn shutdown() -> Option<Arc<MetadataContext>> {
    let context = GLOBAL.write().take();
    if let Some(context) = &context {
        debug!(package = %context.package, "Shut down metadata context");
    }
    context
}

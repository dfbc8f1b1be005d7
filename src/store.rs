//! Metadata store: typed lookups over one identity's bundle
//!
//! A store owns exactly one bundle and never mutates it, so it can be shared
//! across threads behind an `Arc` without further locking.

use std::sync::Arc;

use tracing::debug;

use crate::binding::{Bindable, BindingEngine};
use crate::bundle::Bundle;
use crate::class_registry::{ClassRef, ClassRegistry};
use crate::coerce::{FromMetadata, FromResource};
use crate::error::MetadataError;
use crate::identity::Identity;
use crate::resource::ResourceResolver;
use crate::value::{MetaValue, ResourceKind, ResourceValue, ValueKind};

/// Typed view over the bundle of one identity
pub struct MetadataStore {
    identity: Identity,
    bundle: Arc<Bundle>,
    resolver: Arc<dyn ResourceResolver>,
    classes: Arc<ClassRegistry>,
}

impl MetadataStore {
    pub fn new(
        identity: Identity,
        bundle: Bundle,
        resolver: Arc<dyn ResourceResolver>,
        classes: Arc<ClassRegistry>,
    ) -> Self {
        Self {
            identity,
            bundle: Arc::new(bundle),
            resolver,
            classes,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The raw bundle as loaded
    pub fn get_metadata(&self) -> &Bundle {
        &self.bundle
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Raw value for `key`, no coercion
    pub fn get_value(&self, key: &str) -> Result<&MetaValue, MetadataError> {
        self.bundle
            .get(key)
            .ok_or_else(|| MetadataError::KeyNotFound {
                key: key.to_string(),
                identity: self.identity.to_string(),
            })
    }

    /// Value for `key` coerced to `T`
    pub fn get_as<T: FromMetadata>(&self, key: &str) -> Result<T, MetadataError> {
        let value = self.get_value(key)?;
        T::from_metadata(key, value, &self.classes)
    }

    /// Class named by the string value at `key`
    pub fn get_class(&self, key: &str) -> Result<ClassRef, MetadataError> {
        self.get_as::<ClassRef>(key)
    }

    /// Resolve the resource token stored at `key` as `kind`
    pub fn get_resource(&self, key: &str, kind: ResourceKind) -> Result<ResourceValue, MetadataError> {
        let value = self.get_value(key)?;
        let MetaValue::Resource(token) = value else {
            return Err(MetadataError::TypeMismatch {
                key: key.to_string(),
                expected: "resource reference",
                actual: value.kind(),
            });
        };

        self.resolver.resolve(kind, *token).map_err(|source| {
            debug!(key, %token, %kind, error = %source, "Resource resolution failed");
            MetadataError::ResourceResolution {
                key: key.to_string(),
                token: *token,
                kind,
                source,
            }
        })
    }

    /// Resolve the resource at `key` with the kind inferred from `T`
    pub fn get_resource_as<T: FromResource>(&self, key: &str) -> Result<T, MetadataError> {
        self.get_resource_with(key, T::KIND)
    }

    /// Resolve the resource at `key` as `kind` and read it as `T`
    pub fn get_resource_with<T: FromResource>(
        &self,
        key: &str,
        kind: ResourceKind,
    ) -> Result<T, MetadataError> {
        let resolved = self.get_resource(key, kind)?;
        T::from_resource(resolved).ok_or_else(|| MetadataError::TypeMismatch {
            key: key.to_string(),
            expected: T::EXPECTED,
            actual: ValueKind::Resource,
        })
    }

    /// Populate every declared binding of `target` from this store
    pub fn init_from_metadata<T: Bindable>(&self, target: &mut T) -> Result<(), MetadataError> {
        BindingEngine::new(self).bind(target)
    }
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("identity", &self.identity)
            .field("entries", &self.bundle.len())
            .finish()
    }
}

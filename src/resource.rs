//! Resource resolution (second level of indirection)
//!
//! A bundle may store a [`ResourceToken`] instead of a literal value. The
//! [`ResourceResolver`] turns `(kind, token)` into a concrete
//! [`ResourceValue`]. [`ResourceTable`] is the in-memory resolver used by
//! manifest files and tests.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::{MetadataError, ResolveError};
use crate::value::{ResourceKind, ResourceToken, ResourceValue};

/// Base of every token allocated by [`ResourceTable`]
const TOKEN_BASE: u32 = 0x7f00_0000;

static RESOURCE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Resolves a resource token for a requested kind
pub trait ResourceResolver: Send + Sync {
    fn resolve(&self, kind: ResourceKind, token: ResourceToken)
        -> Result<ResourceValue, ResolveError>;
}

impl<R: ResourceResolver + ?Sized> ResourceResolver for Arc<R> {
    fn resolve(
        &self,
        kind: ResourceKind,
        token: ResourceToken,
    ) -> Result<ResourceValue, ResolveError> {
        (**self).resolve(kind, token)
    }
}

/// In-memory resource table with token allocation
///
/// Tokens are laid out as `0x7fTTNNNN`: `TT` is the kind's type byte and
/// `NNNN` the ordinal of the name within that kind.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    values: FxHashMap<ResourceToken, ResourceValue>,
    names: FxHashMap<(ResourceKind, String), ResourceToken>,
    next_ordinal: FxHashMap<ResourceKind, usize>,
}

impl ResourceTable {
    /// Maximum number of names per kind
    pub const MAX_PER_KIND: usize = 0x1_0000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) a named resource and return its token
    ///
    /// The kind is taken from the value. Redefining an existing name keeps
    /// its token and replaces the value.
    pub fn define(
        &mut self,
        name: &str,
        value: ResourceValue,
    ) -> Result<ResourceToken, MetadataError> {
        let kind = value.kind();
        if !RESOURCE_NAME.is_match(name) {
            return Err(MetadataError::InvalidName {
                name: format!("@{}/{}", kind, name),
                reason: "resource names must be identifiers".into(),
            });
        }

        if let Some(&token) = self.names.get(&(kind, name.to_string())) {
            self.values.insert(token, value);
            return Ok(token);
        }

        let ordinal = self.next_ordinal.get(&kind).copied().unwrap_or(0);
        if ordinal >= Self::MAX_PER_KIND {
            return Err(MetadataError::InvalidName {
                name: format!("@{}/{}", kind, name),
                reason: format!("more than {} {} resources", Self::MAX_PER_KIND, kind),
            });
        }

        let token = ResourceToken::new(TOKEN_BASE | (kind.index() << 16) | ordinal as u32);
        self.names.insert((kind, name.to_string()), token);
        self.values.insert(token, value);
        self.next_ordinal.insert(kind, ordinal + 1);
        Ok(token)
    }

    /// Token for a named resource
    pub fn token(&self, kind: ResourceKind, name: &str) -> Option<ResourceToken> {
        self.names.get(&(kind, name.to_string())).copied()
    }

    /// Stored value regardless of kind
    pub fn get(&self, token: ResourceToken) -> Option<&ResourceValue> {
        self.values.get(&token)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ResourceResolver for ResourceTable {
    fn resolve(
        &self,
        kind: ResourceKind,
        token: ResourceToken,
    ) -> Result<ResourceValue, ResolveError> {
        let value = self.values.get(&token).ok_or(ResolveError::UnknownToken)?;
        if value.kind() != kind {
            return Err(ResolveError::KindMismatch {
                requested: kind,
                actual: value.kind(),
            });
        }
        Ok(value.clone())
    }
}

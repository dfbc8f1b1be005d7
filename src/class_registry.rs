//! Named type registry for class-name metadata values
//!
//! Metadata may name a type by its fully-qualified name. There is no
//! runtime class loading, so the names that can be resolved are the ones
//! registered here up front.

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::MetadataError;
use crate::identity::validate_qualified_name;

/// A resolved class-name value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    name: Arc<str>,
    type_id: TypeId,
    type_name: &'static str,
}

impl ClassRef {
    /// Qualified name the type was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name (diagnostics only)
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Registry of types reachable by qualified name
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: FxHashMap<Arc<str>, ClassRef>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `name`; re-registering a name replaces it
    pub fn register<T: 'static>(&mut self, name: &str) -> Result<&mut Self, MetadataError> {
        validate_qualified_name(name)?;

        let name: Arc<str> = Arc::from(name);
        let class = ClassRef {
            name: Arc::clone(&name),
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        };
        self.classes.insert(name, class);
        Ok(self)
    }

    /// Look up a class by its qualified name
    pub fn resolve(&self, name: &str) -> Option<ClassRef> {
        self.classes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

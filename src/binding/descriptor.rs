//! Binding descriptors: what a type declares and how values reach it

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::coerce::{FromMetadata, FromResource};
use crate::error::MetadataError;
use crate::store::MetadataStore;
use crate::value::ResourceKind;

/// Deferred assignment produced by a successful resolution
pub(crate) type Apply<T> = Box<dyn FnOnce(&mut T)>;

type Resolve<T> = Arc<dyn Fn(&MetadataStore) -> Result<Apply<T>, MetadataError> + Send + Sync>;

/// Where a declaration lives on the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Field,
    Method,
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Field => write!(f, "field"),
            Site::Method => write!(f, "method"),
        }
    }
}

/// How the bundle value is turned into the bound value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Coerce the raw value
    Plain,
    /// Resolve the raw value as a resource token of this kind
    Resource(ResourceKind),
}

// ============================================================================
// DECLARATION
// ============================================================================

/// One binding point on `T`: member, key, and how to resolve it
pub struct Declaration<T> {
    member: &'static str,
    key: String,
    site: Site,
    source: Source,
    resolve: Resolve<T>,
}

impl<T: 'static> Declaration<T> {
    pub fn member(&self) -> &'static str {
        self.member
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn site(&self) -> Site {
        self.site
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Look up and convert the value without touching any target
    pub(crate) fn resolve(&self, store: &MetadataStore) -> Result<Apply<T>, MetadataError> {
        (self.resolve)(store)
    }

    /// Same declaration, applied to the `T` reached through `project`
    fn project<U: 'static>(
        self,
        project: Arc<dyn Fn(&mut U) -> &mut T + Send + Sync>,
    ) -> Declaration<U> {
        let inner = self.resolve;
        Declaration {
            member: self.member,
            key: self.key,
            site: self.site,
            source: self.source,
            resolve: Arc::new(move |store: &MetadataStore| {
                let apply = inner(store)?;
                let project = Arc::clone(&project);
                Ok(Box::new(move |target: &mut U| apply(project(target))) as Apply<U>)
            }),
        }
    }
}

impl<T> Clone for Declaration<T> {
    fn clone(&self) -> Self {
        Self {
            member: self.member,
            key: self.key.clone(),
            site: self.site,
            source: self.source,
            resolve: Arc::clone(&self.resolve),
        }
    }
}

impl<T> fmt::Debug for Declaration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("member", &self.member)
            .field("key", &self.key)
            .field("site", &self.site)
            .field("source", &self.source)
            .finish()
    }
}

// ============================================================================
// BINDING SET
// ============================================================================

/// Ordered declarations of a type: fields, then methods
pub struct BindingSet<T> {
    declarations: Vec<Declaration<T>>,
}

impl<T: 'static> BindingSet<T> {
    pub fn builder() -> BindingSetBuilder<T> {
        BindingSetBuilder::new()
    }

    /// Declarations in application order
    pub fn declarations(&self) -> &[Declaration<T>] {
        &self.declarations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration<T>> {
        self.declarations.iter()
    }

    /// First declaration bound to `key`
    pub fn find(&self, key: &str) -> Option<&Declaration<T>> {
        self.declarations.iter().find(|d| d.key == key)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl<T> Clone for BindingSet<T> {
    fn clone(&self) -> Self {
        Self {
            declarations: self.declarations.clone(),
        }
    }
}

impl<T> fmt::Debug for BindingSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.declarations).finish()
    }
}

/// Fluent builder for [`BindingSet`]
///
/// Each accessor handed to the builder is a write grant: the engine assigns
/// through it and through nothing else.
pub struct BindingSetBuilder<T> {
    inherited_fields: Vec<Declaration<T>>,
    inherited_methods: Vec<Declaration<T>>,
    fields: Vec<Declaration<T>>,
    methods: Vec<Declaration<T>>,
}

impl<T: 'static> Default for BindingSetBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> BindingSetBuilder<T> {
    pub fn new() -> Self {
        Self {
            inherited_fields: Vec::new(),
            inherited_methods: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Bind `key` to a field, coercing the raw value
    pub fn field<V, F>(self, member: &'static str, key: impl Into<String>, access: F) -> Self
    where
        V: FromMetadata + 'static,
        F: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        self.declare(
            Site::Field,
            member,
            key.into(),
            Source::Plain,
            |store, key| store.get_as::<V>(key),
            move |target, value| *access(target) = value,
        )
    }

    /// Bind `key` to a field through a resource of the kind `V` implies
    pub fn resource_field<V, F>(self, member: &'static str, key: impl Into<String>, access: F) -> Self
    where
        V: FromResource + 'static,
        F: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        self.resource_field_as(member, key, <V as FromResource>::KIND, access)
    }

    /// Bind `key` to a field through a resource of an explicit kind
    pub fn resource_field_as<V, F>(
        self,
        member: &'static str,
        key: impl Into<String>,
        kind: ResourceKind,
        access: F,
    ) -> Self
    where
        V: FromResource + 'static,
        F: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        self.declare(
            Site::Field,
            member,
            key.into(),
            Source::Resource(kind),
            move |store, key| store.get_resource_with::<V>(key, kind),
            move |target, value| *access(target) = value,
        )
    }

    /// Bind `key` to a method backed by `memo`
    pub fn method<V, F>(self, member: &'static str, key: impl Into<String>, memo: F) -> Self
    where
        V: FromMetadata + 'static,
        F: Fn(&mut T) -> &mut Memo<V> + Send + Sync + 'static,
    {
        self.declare(
            Site::Method,
            member,
            key.into(),
            Source::Plain,
            |store, key| store.get_as::<V>(key),
            move |target, value| memo(target).store(value),
        )
    }

    /// Bind `key` to a method through a resource of the kind `V` implies
    pub fn resource_method<V, F>(self, member: &'static str, key: impl Into<String>, memo: F) -> Self
    where
        V: FromResource + 'static,
        F: Fn(&mut T) -> &mut Memo<V> + Send + Sync + 'static,
    {
        self.resource_method_as(member, key, <V as FromResource>::KIND, memo)
    }

    pub fn resource_method_as<V, F>(
        self,
        member: &'static str,
        key: impl Into<String>,
        kind: ResourceKind,
        memo: F,
    ) -> Self
    where
        V: FromResource + 'static,
        F: Fn(&mut T) -> &mut Memo<V> + Send + Sync + 'static,
    {
        self.declare(
            Site::Method,
            member,
            key.into(),
            Source::Resource(kind),
            move |store, key| store.get_resource_with::<V>(key, kind),
            move |target, value| memo(target).store(value),
        )
    }

    /// Include an ancestor's declarations, reached through `project`
    ///
    /// Ancestor declarations come before this type's own within each site,
    /// and are dropped when this type declares the same key.
    pub fn inherit<P, G>(mut self, parent: BindingSet<P>, project: G) -> Self
    where
        P: 'static,
        G: Fn(&mut T) -> &mut P + Send + Sync + 'static,
    {
        let project: Arc<dyn Fn(&mut T) -> &mut P + Send + Sync> = Arc::new(project);
        for declaration in parent.declarations {
            let site = declaration.site;
            let projected = declaration.project(Arc::clone(&project));
            match site {
                Site::Field => self.inherited_fields.push(projected),
                Site::Method => self.inherited_methods.push(projected),
            }
        }
        self
    }

    pub fn build(self) -> BindingSet<T> {
        let own: FxHashSet<&str> = self
            .fields
            .iter()
            .chain(&self.methods)
            .map(|d| d.key.as_str())
            .collect();

        let inherited_fields: Vec<_> = self
            .inherited_fields
            .into_iter()
            .filter(|d| !own.contains(d.key.as_str()))
            .collect();
        let inherited_methods: Vec<_> = self
            .inherited_methods
            .into_iter()
            .filter(|d| !own.contains(d.key.as_str()))
            .collect();
        drop(own);

        let mut declarations = inherited_fields;
        declarations.extend(self.fields);
        declarations.extend(inherited_methods);
        declarations.extend(self.methods);

        BindingSet { declarations }
    }

    fn declare<V, R, A>(
        mut self,
        site: Site,
        member: &'static str,
        key: String,
        source: Source,
        read: R,
        assign: A,
    ) -> Self
    where
        V: 'static,
        R: Fn(&MetadataStore, &str) -> Result<V, MetadataError> + Send + Sync + 'static,
        A: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let assign = Arc::new(assign);
        let lookup_key = key.clone();
        let resolve: Resolve<T> = Arc::new(move |store: &MetadataStore| {
            let value = read(store, &lookup_key)?;
            let assign = Arc::clone(&assign);
            Ok(Box::new(move |target: &mut T| assign(target, value)) as Apply<T>)
        });

        let declaration = Declaration {
            member,
            key,
            site,
            source,
            resolve,
        };
        match site {
            Site::Field => self.fields.push(declaration),
            Site::Method => self.methods.push(declaration),
        }
        self
    }
}

// ============================================================================
// MEMO
// ============================================================================

/// Backing slot for a method binding, filled once per bind
///
/// The bound method returns [`Memo::get`] and never goes back to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Memo<V> {
    value: Option<V>,
}

impl<V> Default for Memo<V> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<V> Memo<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn store(&mut self, value: V) {
        self.value = Some(value);
    }
}

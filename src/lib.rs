//! Metabind - declarative metadata binding
//!
//! Reads one flat key/value bundle per identity (the application, or one of
//! its components) and turns it into typed values, either through direct
//! lookups on a [`MetadataStore`] or by binding declared fields and methods
//! of a target with [`BindingEngine`].
//!
//! ```text
//! MetadataContext::get(identity)
//!        ↓
//! MetadataCache (one load per identity) ← BundleProvider
//!        ↓
//! MetadataStore ── get_as / get_resource ──→ ResourceResolver
//!        ↓
//! BindingEngine::bind(&mut target)
//! ```

pub mod binding;
pub mod bundle;
pub mod cache;
pub mod class_registry;
pub mod coerce;
pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod provider;
pub mod resource;
pub mod store;
pub mod value;

pub use binding::{
    Bindable, BindingEngine, BindingSet, BindingSetBuilder, Declaration, Memo, Site, Source,
};
pub use bundle::{Bundle, BundleBuilder};
pub use cache::{CacheStats, MetadataCache};
pub use class_registry::{ClassRef, ClassRegistry};
pub use coerce::{FromMetadata, FromResource};
pub use config::MetadataConfig;
pub use context::{global, init, shutdown, MetadataContext, MetadataContextBuilder};
pub use error::{FixSuggestion, MetadataError, ResolveError};
pub use identity::Identity;
pub use provider::{BundleProvider, ManifestFile, MockProvider, StaticProvider};
pub use resource::{ResourceResolver, ResourceTable};
pub use store::MetadataStore;
pub use value::{Color, MetaValue, ResourceKind, ResourceToken, ResourceValue, ValueKind};

//! Binding Module - declarative population of typed fields from metadata
//!
//! A target type lists its binding points once, through a [`BindingSet`]:
//! - `field`: assign the coerced bundle value to a field
//! - `resource_field`: resolve the resource token first, then assign
//! - `method`: store the value in a [`Memo`] that a getter returns
//! - `inherit`: include the declarations of an embedded ancestor
//!
//! ```text
//! T::bindings() → BindingSet<T>
//!                      ↓
//!     BindingEngine::bind (resolve every declaration)
//!                      ↓
//!          apply all assignments to target
//! ```
//!
//! Registering an accessor with the builder is what grants the engine write
//! access to that binding point; nothing else on the target is touched.
//!
//! ```
//! use metabind::{Bindable, BindingSet, Bundle, Identity, MetadataStore, ResourceTable, ClassRegistry};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Settings {
//!     greeting: String,
//!     retries: i32,
//! }
//!
//! impl Bindable for Settings {
//!     fn bindings() -> BindingSet<Self> {
//!         BindingSet::builder()
//!             .field("greeting", "metadata.string", |s: &mut Self| &mut s.greeting)
//!             .field("retries", "metadata.integer", |s: &mut Self| &mut s.retries)
//!             .build()
//!     }
//! }
//!
//! let store = MetadataStore::new(
//!     Identity::application("com.example").unwrap(),
//!     Bundle::builder()
//!         .string("metadata.string", "Hello, World!")
//!         .int("metadata.integer", 3)
//!         .build(),
//!     Arc::new(ResourceTable::new()),
//!     Arc::new(ClassRegistry::new()),
//! );
//!
//! let mut settings = Settings::default();
//! store.init_from_metadata(&mut settings).unwrap();
//! assert_eq!(settings.greeting, "Hello, World!");
//! assert_eq!(settings.retries, 3);
//! ```

mod descriptor;
mod engine;

pub use descriptor::{BindingSet, BindingSetBuilder, Declaration, Memo, Site, Source};
pub use engine::BindingEngine;

/// Types whose binding points are populated from a metadata store
pub trait Bindable: Sized + 'static {
    /// Every declaration for this type, ancestors included
    fn bindings() -> BindingSet<Self>;
}

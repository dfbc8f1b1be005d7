//! Binding engine: one all-or-nothing pass of declarations against a store

use std::any::type_name;

use tracing::{debug, instrument, warn};

use super::descriptor::{Apply, BindingSet};
use super::Bindable;
use crate::error::MetadataError;
use crate::store::MetadataStore;

/// Populates binding points on targets from one metadata store
#[derive(Debug, Clone, Copy)]
pub struct BindingEngine<'s> {
    store: &'s MetadataStore,
}

impl<'s> BindingEngine<'s> {
    pub fn new(store: &'s MetadataStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'s MetadataStore {
        self.store
    }

    /// Bind every declaration of `T`
    #[instrument(skip_all, fields(identity = %self.store.identity(), target_type = type_name::<T>()))]
    pub fn bind<T: Bindable>(&self, target: &mut T) -> Result<(), MetadataError> {
        self.bind_with(&T::bindings(), target)
    }

    /// Bind an explicit set of declarations
    ///
    /// Every declaration is resolved before the first assignment, so on error
    /// `target` is left exactly as it was.
    pub fn bind_with<T: 'static>(
        &self,
        bindings: &BindingSet<T>,
        target: &mut T,
    ) -> Result<(), MetadataError> {
        let mut pending: Vec<Apply<T>> = Vec::with_capacity(bindings.len());

        for declaration in bindings.iter() {
            match declaration.resolve(self.store) {
                Ok(apply) => pending.push(apply),
                Err(err) => {
                    warn!(
                        member = declaration.member(),
                        key = declaration.key(),
                        site = %declaration.site(),
                        error = %err,
                        "Binding failed"
                    );
                    return Err(err);
                }
            }
        }

        let bound = pending.len();
        for apply in pending {
            apply(&mut *target);
        }

        debug!(bound, "Bound metadata");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Memo;
    use crate::bundle::Bundle;
    use crate::class_registry::{ClassRef, ClassRegistry};
    use crate::identity::Identity;
    use crate::resource::ResourceTable;
    use crate::value::{Color, ResourceKind, ResourceValue};
    use std::sync::Arc;

    struct Handler;

    fn store() -> MetadataStore {
        let mut resources = ResourceTable::new();
        let hello = resources
            .define("hello_world", ResourceValue::String("Hello, World!".into()))
            .unwrap();
        let black = resources
            .define("black", ResourceValue::Color(Color::BLACK))
            .unwrap();
        let dimen = resources
            .define("sample_dimen", ResourceValue::Dimension(16.5))
            .unwrap();

        let mut classes = ClassRegistry::new();
        classes.register::<Handler>("com.example.Handler").unwrap();

        MetadataStore::new(
            Identity::application("com.example").unwrap(),
            Bundle::builder()
                .string("metadata.string", "Hello, World!")
                .int("metadata.integer", 42)
                .bool("metadata.flag", true)
                .string("metadata.classname", "com.example.Handler")
                .resource("metadata.resource.string", hello)
                .resource("metadata.resource.color", black)
                .resource("metadata.resource.dimension", dimen)
                .build(),
            Arc::new(resources),
            Arc::new(classes),
        )
    }

    #[derive(Default)]
    struct Base {
        text: String,
        flag: bool,
    }

    impl Bindable for Base {
        fn bindings() -> BindingSet<Self> {
            BindingSet::builder()
                .field("text", "metadata.string", |b: &mut Self| &mut b.text)
                .field("flag", "metadata.flag", |b: &mut Self| &mut b.flag)
                .build()
        }
    }

    #[derive(Default)]
    struct Screen {
        base: Base,
        number: i32,
        handler: Memo<ClassRef>,
        color: Color,
        size: Memo<f32>,
        title: Memo<String>,
    }

    impl Screen {
        fn size(&self) -> f32 {
            self.size.get().copied().unwrap_or_default()
        }

        fn title(&self) -> &str {
            self.title.get().map(String::as_str).unwrap_or_default()
        }
    }

    impl Bindable for Screen {
        fn bindings() -> BindingSet<Self> {
            BindingSet::builder()
                .inherit(Base::bindings(), |s: &mut Self| &mut s.base)
                .field("number", "metadata.integer", |s: &mut Self| &mut s.number)
                .method("handler", "metadata.classname", |s: &mut Self| &mut s.handler)
                .resource_field("color", "metadata.resource.color", |s: &mut Self| &mut s.color)
                .resource_method("size", "metadata.resource.dimension", |s: &mut Self| &mut s.size)
                .resource_method_as(
                    "title",
                    "metadata.resource.string",
                    ResourceKind::String,
                    |s: &mut Self| &mut s.title,
                )
                .build()
        }
    }

    #[test]
    fn binds_fields_methods_and_ancestors() {
        let store = store();
        let mut screen = Screen::default();
        BindingEngine::new(&store).bind(&mut screen).unwrap();

        assert_eq!(screen.base.text, "Hello, World!");
        assert!(screen.base.flag);
        assert_eq!(screen.number, 42);
        assert!(screen.handler.get().unwrap().is::<Handler>());
        assert_eq!(screen.color, Color::BLACK);
        assert_eq!(screen.size(), 16.5);
        assert_eq!(screen.title(), "Hello, World!");
    }

    #[test]
    fn bound_values_match_direct_lookups() {
        let store = store();
        let mut screen = Screen::default();
        store.init_from_metadata(&mut screen).unwrap();

        assert_eq!(screen.number, store.get_as::<i32>("metadata.integer").unwrap());
        assert_eq!(
            screen.color,
            store.get_resource_as::<Color>("metadata.resource.color").unwrap()
        );
    }

    #[derive(Default)]
    struct Widget {
        label: String,
        visible: bool,
        depth: i32,
    }

    impl Bindable for Widget {
        fn bindings() -> BindingSet<Self> {
            BindingSet::builder()
                .field("label", "metadata.string", |w: &mut Self| &mut w.label)
                .field("visible", "metadata.flag", |w: &mut Self| &mut w.visible)
                .field("depth", "metadata.integer", |w: &mut Self| &mut w.depth)
                .build()
        }
    }

    #[derive(Default)]
    struct Panel {
        widget: Widget,
        enabled: bool,
        handler: Memo<ClassRef>,
    }

    impl Bindable for Panel {
        fn bindings() -> BindingSet<Self> {
            BindingSet::builder()
                .inherit(Widget::bindings(), |p: &mut Self| &mut p.widget)
                .field("enabled", "metadata.flag", |p: &mut Self| &mut p.enabled)
                .method("handler", "metadata.classname", |p: &mut Self| &mut p.handler)
                .build()
        }
    }

    #[derive(Default)]
    struct Dialog {
        panel: Panel,
        count: i32,
        accent: Memo<Color>,
    }

    impl Bindable for Dialog {
        fn bindings() -> BindingSet<Self> {
            BindingSet::builder()
                .resource_method("accent", "metadata.resource.color", |d: &mut Self| &mut d.accent)
                .field("count", "metadata.integer", |d: &mut Self| &mut d.count)
                .inherit(Panel::bindings(), |d: &mut Self| &mut d.panel)
                .build()
        }
    }

    #[test]
    fn three_level_chain_orders_and_shadows() {
        let bindings = Dialog::bindings();
        let order: Vec<(&str, &str)> = bindings
            .iter()
            .map(|d| (d.member(), d.key()))
            .collect();

        // Widget's flag is shadowed by Panel, its integer by Dialog
        assert_eq!(
            order,
            vec![
                ("label", "metadata.string"),
                ("enabled", "metadata.flag"),
                ("count", "metadata.integer"),
                ("handler", "metadata.classname"),
                ("accent", "metadata.resource.color"),
            ]
        );
    }

    #[test]
    fn three_level_chain_binds_through_projections() {
        let store = store();
        let mut dialog = Dialog::default();
        store.init_from_metadata(&mut dialog).unwrap();

        assert_eq!(dialog.panel.widget.label, "Hello, World!");
        assert!(dialog.panel.enabled);
        assert!(dialog.panel.handler.get().unwrap().is::<Handler>());
        assert_eq!(dialog.count, 42);
        assert_eq!(dialog.accent.get(), Some(&Color::BLACK));

        // Shadowed ancestor members are never written
        assert!(!dialog.panel.widget.visible);
        assert_eq!(dialog.panel.widget.depth, 0);
    }

    #[derive(Default, Debug, PartialEq)]
    struct Partial {
        text: String,
        missing: i32,
    }

    impl Bindable for Partial {
        fn bindings() -> BindingSet<Self> {
            BindingSet::builder()
                .field("text", "metadata.string", |p: &mut Self| &mut p.text)
                .field("missing", "metadata.missing", |p: &mut Self| &mut p.missing)
                .build()
        }
    }

    #[test]
    fn failure_leaves_target_untouched() {
        let store = store();
        let mut partial = Partial::default();

        let err = BindingEngine::new(&store).bind(&mut partial).unwrap_err();
        assert!(matches!(err, MetadataError::KeyNotFound { ref key, .. } if key == "metadata.missing"));
        assert_eq!(partial, Partial::default());
    }

    #[test]
    fn wrong_type_aborts_bind() {
        #[derive(Default)]
        struct Wrong {
            number: String,
        }

        impl Bindable for Wrong {
            fn bindings() -> BindingSet<Self> {
                BindingSet::builder()
                    .field("number", "metadata.integer", |w: &mut Self| &mut w.number)
                    .build()
            }
        }

        let store = store();
        let mut wrong = Wrong::default();
        assert!(matches!(
            store.init_from_metadata(&mut wrong),
            Err(MetadataError::TypeMismatch { .. })
        ));
        assert!(wrong.number.is_empty());
    }

    #[test]
    fn explicit_kind_mismatch_is_resolution_error() {
        #[derive(Default)]
        struct Target {
            text: String,
        }

        let bindings = BindingSet::<Target>::builder()
            .resource_field_as("text", "metadata.resource.color", ResourceKind::String, |t: &mut Target| {
                &mut t.text
            })
            .build();

        let store = store();
        let mut target = Target::default();
        let err = BindingEngine::new(&store)
            .bind_with(&bindings, &mut target)
            .unwrap_err();
        assert!(matches!(err, MetadataError::ResourceResolution { .. }));
    }

    #[test]
    fn rebinding_refreshes_memo() {
        let store = store();
        let mut screen = Screen::default();
        let engine = BindingEngine::new(&store);

        engine.bind(&mut screen).unwrap();
        screen.number = 0;
        engine.bind(&mut screen).unwrap();

        assert_eq!(screen.number, 42);
        assert!(screen.size.is_bound());
    }
}

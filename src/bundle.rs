//! Raw metadata bundle (flat key → value)
//!
//! Built once by a provider and never mutated afterwards. Uses FxHashMap for
//! faster hashing on small string keys.

use rustc_hash::FxHashMap;

use crate::value::{MetaValue, ResourceToken};

/// Immutable flat mapping from metadata key to raw value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    entries: FxHashMap<String, MetaValue>,
}

impl Bundle {
    /// Empty bundle (components that declare no metadata)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> BundleBuilder {
        BundleBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, MetaValue)> for Bundle {
    fn from_iter<I: IntoIterator<Item = (K, MetaValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Fluent builder for [`Bundle`]
#[derive(Debug, Default)]
pub struct BundleBuilder {
    entries: FxHashMap<String, MetaValue>,
}

impl BundleBuilder {
    /// Insert any raw value; a repeated key replaces the earlier value
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, MetaValue::String(value.into()))
    }

    pub fn int(self, key: impl Into<String>, value: i32) -> Self {
        self.insert(key, MetaValue::Int(value))
    }

    pub fn bool(self, key: impl Into<String>, value: bool) -> Self {
        self.insert(key, MetaValue::Bool(value))
    }

    pub fn float(self, key: impl Into<String>, value: f32) -> Self {
        self.insert(key, MetaValue::Float(value))
    }

    pub fn resource(self, key: impl Into<String>, token: ResourceToken) -> Self {
        self.insert(key, MetaValue::Resource(token))
    }

    pub fn build(self) -> Bundle {
        Bundle {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_entries() {
        let bundle = Bundle::builder()
            .string("metadata.string", "Hello, World!")
            .int("metadata.integer", 42)
            .bool("metadata.flag", true)
            .float("metadata.ratio", 0.5)
            .resource("metadata.resource", ResourceToken::new(0x7f01_0000))
            .build();

        assert_eq!(bundle.len(), 5);
        assert!(bundle.contains_key("metadata.string"));
        assert_eq!(bundle.get("metadata.integer"), Some(&MetaValue::Int(42)));
        assert_eq!(bundle.get("missing"), None);
    }

    #[test]
    fn keys_are_sorted() {
        let bundle = Bundle::builder().int("b", 2).int("a", 1).int("c", 3).build();
        assert_eq!(bundle.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn later_insert_wins() {
        let bundle = Bundle::builder().int("k", 1).string("k", "two").build();
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.get("k"), Some(&MetaValue::from("two")));
    }

    #[test]
    fn empty_bundle() {
        let bundle = Bundle::empty();
        assert!(bundle.is_empty());
        assert!(bundle.keys().is_empty());
    }

    #[test]
    fn from_iterator() {
        let bundle: Bundle = vec![("x", MetaValue::Int(1)), ("y", MetaValue::Bool(false))]
            .into_iter()
            .collect();
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.iter().count(), 2);
    }
}

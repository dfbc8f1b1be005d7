//! Coercion from raw and resolved values into Rust types
//!
//! Rules are strict: each stored kind converts only to its own type. The one
//! cross-kind conversion is a resource reference read as `i32`, which yields
//! the token's raw handle (tokens are integer handles).

use crate::class_registry::{ClassRef, ClassRegistry};
use crate::error::MetadataError;
use crate::value::{Color, MetaValue, ResourceKind, ResourceToken, ResourceValue};

/// Types a raw bundle value can be read as
pub trait FromMetadata: Sized {
    /// Type name used in mismatch errors
    const EXPECTED: &'static str;

    fn from_metadata(
        key: &str,
        value: &MetaValue,
        classes: &ClassRegistry,
    ) -> Result<Self, MetadataError>;
}

/// Types a resolved resource can be read as
pub trait FromResource: Sized {
    /// Kind inferred when a binding does not name one
    const KIND: ResourceKind;
    const EXPECTED: &'static str;

    fn from_resource(value: ResourceValue) -> Option<Self>;
}

fn mismatch<T: FromMetadata>(key: &str, value: &MetaValue) -> MetadataError {
    MetadataError::TypeMismatch {
        key: key.to_string(),
        expected: T::EXPECTED,
        actual: value.kind(),
    }
}

impl FromMetadata for MetaValue {
    const EXPECTED: &'static str = "any value";

    fn from_metadata(_: &str, value: &MetaValue, _: &ClassRegistry) -> Result<Self, MetadataError> {
        Ok(value.clone())
    }
}

impl FromMetadata for String {
    const EXPECTED: &'static str = "string";

    fn from_metadata(key: &str, value: &MetaValue, _: &ClassRegistry) -> Result<Self, MetadataError> {
        match value {
            MetaValue::String(s) => Ok(s.clone()),
            other => Err(mismatch::<Self>(key, other)),
        }
    }
}

impl FromMetadata for i32 {
    const EXPECTED: &'static str = "integer";

    fn from_metadata(key: &str, value: &MetaValue, _: &ClassRegistry) -> Result<Self, MetadataError> {
        match value {
            MetaValue::Int(i) => Ok(*i),
            // Handles are u32 bit patterns; keep the bits
            MetaValue::Resource(token) => Ok(token.raw() as i32),
            other => Err(mismatch::<Self>(key, other)),
        }
    }
}

impl FromMetadata for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_metadata(key: &str, value: &MetaValue, _: &ClassRegistry) -> Result<Self, MetadataError> {
        match value {
            MetaValue::Bool(b) => Ok(*b),
            other => Err(mismatch::<Self>(key, other)),
        }
    }
}

impl FromMetadata for f32 {
    const EXPECTED: &'static str = "float";

    fn from_metadata(key: &str, value: &MetaValue, _: &ClassRegistry) -> Result<Self, MetadataError> {
        match value {
            MetaValue::Float(x) => Ok(*x),
            other => Err(mismatch::<Self>(key, other)),
        }
    }
}

impl FromMetadata for ResourceToken {
    const EXPECTED: &'static str = "resource reference";

    fn from_metadata(key: &str, value: &MetaValue, _: &ClassRegistry) -> Result<Self, MetadataError> {
        match value {
            MetaValue::Resource(token) => Ok(*token),
            other => Err(mismatch::<Self>(key, other)),
        }
    }
}

impl FromMetadata for ClassRef {
    const EXPECTED: &'static str = "class name";

    fn from_metadata(
        key: &str,
        value: &MetaValue,
        classes: &ClassRegistry,
    ) -> Result<Self, MetadataError> {
        let MetaValue::String(name) = value else {
            return Err(mismatch::<Self>(key, value));
        };
        classes
            .resolve(name)
            .ok_or_else(|| MetadataError::ClassResolution {
                key: key.to_string(),
                class_name: name.clone(),
            })
    }
}

/// A present value read into an optional slot
impl<T: FromMetadata> FromMetadata for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_metadata(
        key: &str,
        value: &MetaValue,
        classes: &ClassRegistry,
    ) -> Result<Self, MetadataError> {
        T::from_metadata(key, value, classes).map(Some)
    }
}

impl FromResource for String {
    const KIND: ResourceKind = ResourceKind::String;
    const EXPECTED: &'static str = "string";

    fn from_resource(value: ResourceValue) -> Option<Self> {
        match value {
            ResourceValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FromResource for i32 {
    const KIND: ResourceKind = ResourceKind::Integer;
    const EXPECTED: &'static str = "integer";

    fn from_resource(value: ResourceValue) -> Option<Self> {
        match value {
            ResourceValue::Integer(i) => Some(i),
            _ => None,
        }
    }
}

impl FromResource for bool {
    const KIND: ResourceKind = ResourceKind::Boolean;
    const EXPECTED: &'static str = "boolean";

    fn from_resource(value: ResourceValue) -> Option<Self> {
        match value {
            ResourceValue::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl FromResource for f32 {
    const KIND: ResourceKind = ResourceKind::Dimension;
    const EXPECTED: &'static str = "dimension";

    fn from_resource(value: ResourceValue) -> Option<Self> {
        match value {
            ResourceValue::Dimension(x) => Some(x),
            _ => None,
        }
    }
}

impl FromResource for Color {
    const KIND: ResourceKind = ResourceKind::Color;
    const EXPECTED: &'static str = "color";

    fn from_resource(value: ResourceValue) -> Option<Self> {
        match value {
            ResourceValue::Color(c) => Some(c),
            _ => None,
        }
    }
}

//! Manifest file provider (YAML or JSON)
//!
//! One document declares the package, its resources and the metadata blocks
//! of the application and each component:
//!
//! ```yaml
//! package: com.example.app
//! resources:
//!   string:
//!     hello_world: "Hello, World!"
//!   color:
//!     black: "#FF000000"
//! application:
//!   metadata:
//!     metadata.string: "Hello, World!"
//!     metadata.integer: 42
//!     metadata.resource.string: "@string/hello_world"
//! components:
//!   .MainActivity:
//!     metadata:
//!       metadata.activity.string: "Hello, World"
//! ```
//!
//! Strings of the form `@kind/name` become resource tokens; `\@` escapes a
//! literal leading `@`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::debug;

use super::BundleProvider;
use crate::bundle::Bundle;
use crate::error::MetadataError;
use crate::identity::Identity;
use crate::resource::ResourceTable;
use crate::value::{Color, MetaValue, ResourceKind, ResourceValue};

/// `@kind/name`
static RESOURCE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@([a-z]+)/([A-Za-z_][A-Za-z0-9_]*)$").unwrap());

// ============================================================================
// DOCUMENT SHAPE
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestDoc {
    package: String,
    #[serde(default)]
    resources: ResourcesDoc,
    #[serde(default)]
    application: ComponentDoc,
    #[serde(default)]
    components: BTreeMap<String, ComponentDoc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourcesDoc {
    #[serde(default)]
    string: BTreeMap<String, String>,
    #[serde(default)]
    integer: BTreeMap<String, i32>,
    #[serde(default)]
    bool: BTreeMap<String, bool>,
    #[serde(default)]
    dimen: BTreeMap<String, f64>,
    #[serde(default)]
    color: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentDoc {
    #[serde(default)]
    metadata: BTreeMap<String, ScalarDoc>,
}

/// Scalar metadata value (order matters: untagged tries each in turn)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScalarDoc {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

// ============================================================================
// MANIFEST FILE
// ============================================================================

/// Parsed manifest: bundles per identity plus the resource table they reference
#[derive(Debug, Clone)]
pub struct ManifestFile {
    package: String,
    resources: Arc<ResourceTable>,
    application: Bundle,
    components: FxHashMap<Identity, Bundle>,
}

impl ManifestFile {
    /// Read a manifest; `.json` files are parsed as JSON, everything else as YAML
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let origin = path.display().to_string();

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let doc: ManifestDoc = if is_json {
            serde_json::from_str(&text).map_err(|e| parse_error(&origin, e))?
        } else {
            serde_yaml::from_str(&text).map_err(|e| parse_error(&origin, e))?
        };
        Self::from_doc(doc, &origin)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, MetadataError> {
        let doc: ManifestDoc = serde_yaml::from_str(text).map_err(|e| parse_error("<yaml>", e))?;
        Self::from_doc(doc, "<yaml>")
    }

    pub fn from_json_str(text: &str) -> Result<Self, MetadataError> {
        let doc: ManifestDoc = serde_json::from_str(text).map_err(|e| parse_error("<json>", e))?;
        Self::from_doc(doc, "<json>")
    }

    fn from_doc(doc: ManifestDoc, origin: &str) -> Result<Self, MetadataError> {
        // Validates the package name
        Identity::application(&doc.package)?;

        let resources = build_resources(&doc.resources, origin)?;
        let application = build_bundle(&doc.application, &resources, origin)?;

        let mut components = FxHashMap::default();
        for (name, component) in &doc.components {
            let identity = Identity::component(&doc.package, name)?;
            let bundle = build_bundle(component, &resources, origin)?;
            if components.insert(identity.clone(), bundle).is_some() {
                return Err(MetadataError::ManifestParse {
                    origin: origin.to_string(),
                    details: format!("component '{}' is declared twice", identity),
                });
            }
        }

        debug!(
            origin,
            package = %doc.package,
            resources = resources.len(),
            components = components.len(),
            "Parsed manifest"
        );

        Ok(Self {
            package: doc.package,
            resources: Arc::new(resources),
            application,
            components,
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Resource table referenced by this manifest's tokens
    pub fn resources(&self) -> Arc<ResourceTable> {
        Arc::clone(&self.resources)
    }

    /// Identities of all declared components
    pub fn components(&self) -> impl Iterator<Item = &Identity> {
        self.components.keys()
    }
}

impl BundleProvider for ManifestFile {
    fn load_bundle(&self, identity: &Identity) -> Result<Bundle, MetadataError> {
        let not_found = || MetadataError::IdentityNotFound {
            identity: identity.to_string(),
        };

        if identity.package() != self.package {
            return Err(not_found());
        }
        match identity {
            Identity::Application { .. } => Ok(self.application.clone()),
            Identity::Component { .. } => self.components.get(identity).cloned().ok_or_else(not_found),
        }
    }
}

fn parse_error(origin: &str, err: impl std::fmt::Display) -> MetadataError {
    MetadataError::ManifestParse {
        origin: origin.to_string(),
        details: err.to_string(),
    }
}

/// Narrow a parsed float, rejecting values that overflow `f32`
fn narrow_f32(origin: &str, what: &str, x: f64) -> Result<f32, MetadataError> {
    let narrowed = x as f32;
    if x.is_finite() && !narrowed.is_finite() {
        return Err(parse_error(origin, format!("{}: {} does not fit in 32 bits", what, x)));
    }
    Ok(narrowed)
}

fn build_resources(doc: &ResourcesDoc, origin: &str) -> Result<ResourceTable, MetadataError> {
    let mut table = ResourceTable::new();

    for (name, value) in &doc.string {
        table.define(name, ResourceValue::String(value.clone()))?;
    }
    for (name, value) in &doc.integer {
        table.define(name, ResourceValue::Integer(*value))?;
    }
    for (name, value) in &doc.bool {
        table.define(name, ResourceValue::Boolean(*value))?;
    }
    for (name, value) in &doc.dimen {
        let value = narrow_f32(origin, &format!("@dimen/{}", name), *value)?;
        table.define(name, ResourceValue::Dimension(value))?;
    }
    for (name, value) in &doc.color {
        let color: Color = value
            .parse()
            .map_err(|e: String| parse_error(origin, format!("@color/{}: {}", name, e)))?;
        table.define(name, ResourceValue::Color(color))?;
    }

    Ok(table)
}

fn build_bundle(
    doc: &ComponentDoc,
    resources: &ResourceTable,
    origin: &str,
) -> Result<Bundle, MetadataError> {
    let mut builder = Bundle::builder();
    for (key, scalar) in &doc.metadata {
        let value = to_meta_value(key, scalar, resources, origin)?;
        builder = builder.insert(key.clone(), value);
    }
    Ok(builder.build())
}

fn to_meta_value(
    key: &str,
    scalar: &ScalarDoc,
    resources: &ResourceTable,
    origin: &str,
) -> Result<MetaValue, MetadataError> {
    match scalar {
        ScalarDoc::Bool(b) => Ok(MetaValue::Bool(*b)),
        ScalarDoc::Int(i) => i32::try_from(*i)
            .map(MetaValue::Int)
            .map_err(|_| parse_error(origin, format!("'{}': {} does not fit in 32 bits", key, i))),
        ScalarDoc::Float(x) => narrow_f32(origin, &format!("'{}'", key), *x).map(MetaValue::Float),
        ScalarDoc::String(s) => {
            if let Some(literal) = s.strip_prefix('\\') {
                if literal.starts_with('@') {
                    return Ok(MetaValue::String(literal.to_string()));
                }
            }
            if !s.starts_with('@') {
                return Ok(MetaValue::String(s.clone()));
            }

            let caps = RESOURCE_REF.captures(s).ok_or_else(|| {
                parse_error(origin, format!("'{}': malformed resource reference '{}'", key, s))
            })?;
            let kind: ResourceKind = caps[1]
                .parse()
                .map_err(|e: String| parse_error(origin, format!("'{}': {}", key, e)))?;
            let token = resources.token(kind, &caps[2]).ok_or_else(|| {
                parse_error(origin, format!("'{}': undefined resource '{}'", key, s))
            })?;
            Ok(MetaValue::Resource(token))
        }
    }
}

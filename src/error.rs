//! Error types with fix suggestions

use thiserror::Error;

use crate::value::{ResourceKind, ResourceToken, ValueKind};

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// All failures surfaced by lookups, bundle loads and binding passes.
///
/// None of these are recovered locally: every variant reaches the caller.
#[derive(Error, Debug)]
pub enum MetadataError {
    // ─────────────────────────────────────────────────────────────
    // Identity errors (META-001 to META-002)
    // ─────────────────────────────────────────────────────────────

    #[error("META-001: No metadata registered for '{identity}'")]
    IdentityNotFound { identity: String },

    #[error("META-002: Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Lookup errors (META-010 to META-011)
    // ─────────────────────────────────────────────────────────────

    #[error("META-010: Key '{key}' not found in metadata for '{identity}'")]
    KeyNotFound { key: String, identity: String },

    #[error("META-011: Key '{key}' holds {actual}, cannot read it as {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: ValueKind,
    },

    // ─────────────────────────────────────────────────────────────
    // Resource errors (META-020)
    // ─────────────────────────────────────────────────────────────

    #[error("META-020: Cannot resolve {kind} resource {token} for key '{key}': {source}")]
    ResourceResolution {
        key: String,
        token: ResourceToken,
        kind: ResourceKind,
        #[source]
        source: ResolveError,
    },

    // ─────────────────────────────────────────────────────────────
    // Class errors (META-030)
    // ─────────────────────────────────────────────────────────────

    #[error("META-030: Key '{key}' names class '{class_name}' which is not registered")]
    ClassResolution { key: String, class_name: String },

    // ─────────────────────────────────────────────────────────────
    // Manifest errors (META-040 to META-041)
    // ─────────────────────────────────────────────────────────────

    #[error("META-040: Invalid manifest {origin}: {details}")]
    ManifestParse { origin: String, details: String },

    #[error("META-041: IO error: {0}")]
    ManifestIo(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Lifecycle errors (META-050 to META-051)
    // ─────────────────────────────────────────────────────────────

    #[error("META-050: Metadata context is not initialized")]
    NotInitialized,

    #[error("META-051: Metadata context is already initialized")]
    AlreadyInitialized,
}

impl FixSuggestion for MetadataError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            MetadataError::IdentityNotFound { .. } => {
                Some("Declare the component in the manifest or check the package name")
            }
            MetadataError::InvalidName { .. } => {
                Some("Use a dotted identifier like com.example.app or .MainActivity")
            }
            MetadataError::KeyNotFound { .. } => {
                Some("Add the key to the component's metadata block")
            }
            MetadataError::TypeMismatch { .. } => {
                Some("Request the key with the type it is stored as (no implicit conversions)")
            }
            MetadataError::ResourceResolution { .. } => {
                Some("Check that the resource exists and is declared with the requested kind")
            }
            MetadataError::ClassResolution { .. } => {
                Some("Register the type with ClassRegistry::register before binding")
            }
            MetadataError::ManifestParse { .. } => {
                Some("Check manifest syntax: package, resources and metadata blocks")
            }
            MetadataError::ManifestIo(_) => Some("Check file path and permissions"),
            MetadataError::NotInitialized => Some("Call metabind::init before metabind::global"),
            MetadataError::AlreadyInitialized => {
                Some("Call metabind::shutdown before initializing a new context")
            }
        }
    }
}

/// Failure reported by a [`crate::ResourceResolver`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown resource token")]
    UnknownToken,

    #[error("resource is a {actual} resource, not {requested}")]
    KindMismatch {
        requested: ResourceKind,
        actual: ResourceKind,
    },
}

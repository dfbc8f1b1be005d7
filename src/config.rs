//! Configuration for loading metadata from a manifest file
//!
//! Defaults can be overridden with environment variables:
//! - `METABIND_MANIFEST`: manifest path (default `metadata.yaml`)
//! - `METABIND_PACKAGE`: package the manifest must declare

use std::path::{Path, PathBuf};

/// Environment variable overriding the manifest path
pub const MANIFEST_ENV: &str = "METABIND_MANIFEST";

/// Environment variable pinning the expected package
pub const PACKAGE_ENV: &str = "METABIND_PACKAGE";

/// Manifest path used when nothing else is configured
pub const DEFAULT_MANIFEST: &str = "metadata.yaml";

/// Where metadata comes from and what it must describe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataConfig {
    /// Manifest file (YAML, or JSON by `.json` extension)
    pub manifest_path: PathBuf,
    /// If set, the manifest's package must match
    pub package: Option<String>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            package: None,
        }
    }
}

impl MetadataConfig {
    /// Defaults overridden by `METABIND_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup(MANIFEST_ENV).filter(|p| !p.is_empty()) {
            config.manifest_path = PathBuf::from(path);
        }
        config.package = lookup(PACKAGE_ENV).filter(|p| !p.is_empty());
        config
    }

    pub fn with_manifest_path(mut self, path: impl AsRef<Path>) -> Self {
        self.manifest_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }
}

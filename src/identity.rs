//! Identities that select which bundle to load
//!
//! An identity is either the whole application (`com.example.app`) or one
//! named component inside it (`com.example.app/com.example.app.MainActivity`).
//! Component names follow manifest conventions: a leading `.` or a name with
//! no dots at all is relative to the application package.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MetadataError;

/// Dotted identifier: `com.example.App`, `com.example.Outer$Inner`
static QUALIFIED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*)*$").unwrap());

/// Cache key for a metadata bundle. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Application { package: Arc<str> },
    Component { package: Arc<str>, component: Arc<str> },
}

impl Identity {
    /// Identity of the application-level bundle
    pub fn application(package: impl AsRef<str>) -> Result<Self, MetadataError> {
        let package = package.as_ref();
        validate_qualified_name(package)?;
        Ok(Identity::Application {
            package: Arc::from(package),
        })
    }

    /// Identity of a component bundle; relative names are expanded against `package`
    pub fn component(
        package: impl AsRef<str>,
        component: impl AsRef<str>,
    ) -> Result<Self, MetadataError> {
        let package = package.as_ref();
        validate_qualified_name(package)?;

        let component = expand_component_name(package, component.as_ref());
        validate_qualified_name(&component)?;

        Ok(Identity::Component {
            package: Arc::from(package),
            component: Arc::from(component),
        })
    }

    pub fn package(&self) -> &str {
        match self {
            Identity::Application { package } | Identity::Component { package, .. } => package,
        }
    }

    /// Fully-qualified component name, `None` for the application identity
    pub fn component_name(&self) -> Option<&str> {
        match self {
            Identity::Application { .. } => None,
            Identity::Component { component, .. } => Some(component),
        }
    }

    pub fn is_application(&self) -> bool {
        matches!(self, Identity::Application { .. })
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Application { package } => write!(f, "{}", package),
            Identity::Component { package, component } => write!(f, "{}/{}", package, component),
        }
    }
}

/// Expand `.Name` and bare `Name` against the package
pub fn expand_component_name(package: &str, name: &str) -> String {
    if let Some(rest) = name.strip_prefix('.') {
        format!("{}.{}", package, rest)
    } else if !name.contains('.') {
        format!("{}.{}", package, name)
    } else {
        name.to_string()
    }
}

pub(crate) fn validate_qualified_name(name: &str) -> Result<(), MetadataError> {
    if name.is_empty() {
        return Err(MetadataError::InvalidName {
            name: name.to_string(),
            reason: "cannot be empty".into(),
        });
    }
    if !QUALIFIED_NAME.is_match(name) {
        return Err(MetadataError::InvalidName {
            name: name.to_string(),
            reason: "must be dot-separated identifiers".into(),
        });
    }
    Ok(())
}

//! Raw bundle values and resolved resource values
//!
//! A bundle entry is one of five kinds. Resource references add a second
//! level of indirection: the stored [`ResourceToken`] only becomes a concrete
//! value once a [`crate::ResourceResolver`] resolves it for a [`ResourceKind`].

use std::fmt;
use std::str::FromStr;

// ============================================================================
// RAW VALUES
// ============================================================================

/// A raw value as stored in a bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    String(String),
    Int(i32),
    Bool(bool),
    Float(f32),
    Resource(ResourceToken),
}

impl MetaValue {
    /// The stored kind, used for coercion checks and error messages
    pub fn kind(&self) -> ValueKind {
        match self {
            MetaValue::String(_) => ValueKind::String,
            MetaValue::Int(_) => ValueKind::Int,
            MetaValue::Bool(_) => ValueKind::Bool,
            MetaValue::Float(_) => ValueKind::Float,
            MetaValue::Resource(_) => ValueKind::Resource,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::String(s) => write!(f, "{}", s),
            MetaValue::Int(i) => write!(f, "{}", i),
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Float(x) => write!(f, "{}", x),
            MetaValue::Resource(token) => write!(f, "{}", token),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::String(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::String(value)
    }
}

impl From<i32> for MetaValue {
    fn from(value: i32) -> Self {
        MetaValue::Int(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<f32> for MetaValue {
    fn from(value: f32) -> Self {
        MetaValue::Float(value)
    }
}

impl From<ResourceToken> for MetaValue {
    fn from(value: ResourceToken) -> Self {
        MetaValue::Resource(value)
    }
}

/// Discriminant of [`MetaValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Int,
    Bool,
    Float,
    Resource,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Int => "integer",
            ValueKind::Bool => "boolean",
            ValueKind::Float => "float",
            ValueKind::Resource => "resource reference",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RESOURCE TOKEN
// ============================================================================

/// Opaque integer handle naming an entry in a resource table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceToken(u32);

impl ResourceToken {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ResourceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

// ============================================================================
// RESOURCE KIND
// ============================================================================

/// How a resource token should be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    String,
    Integer,
    Boolean,
    Dimension,
    Color,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::String,
        ResourceKind::Integer,
        ResourceKind::Boolean,
        ResourceKind::Dimension,
        ResourceKind::Color,
    ];

    /// Prefix used in `@kind/name` references
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::String => "string",
            ResourceKind::Integer => "integer",
            ResourceKind::Boolean => "bool",
            ResourceKind::Dimension => "dimen",
            ResourceKind::Color => "color",
        }
    }

    /// Type byte folded into allocated tokens (`0x7fTT....`)
    pub(crate) fn index(&self) -> u32 {
        match self {
            ResourceKind::String => 1,
            ResourceKind::Integer => 2,
            ResourceKind::Boolean => 3,
            ResourceKind::Dimension => 4,
            ResourceKind::Color => 5,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.type_name() == s)
            .ok_or_else(|| format!("unknown resource kind '{}'", s))
    }
}

// ============================================================================
// RESOLVED VALUES
// ============================================================================

/// A concrete value produced by resolving a resource token
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceValue {
    String(String),
    Integer(i32),
    Boolean(bool),
    Dimension(f32),
    Color(Color),
}

impl ResourceValue {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceValue::String(_) => ResourceKind::String,
            ResourceValue::Integer(_) => ResourceKind::Integer,
            ResourceValue::Boolean(_) => ResourceKind::Boolean,
            ResourceValue::Dimension(_) => ResourceKind::Dimension,
            ResourceValue::Color(_) => ResourceKind::Color,
        }
    }
}

/// ARGB color value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    pub fn argb(&self) -> u32 {
        self.0
    }

    pub fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts `#RGB`, `#ARGB`, `#RRGGBB` and `#AARRGGBB`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("color '{}' must start with '#'", s))?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("color '{}' is not hexadecimal", s));
        }

        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            n => return Err(format!("color '{}' has {} digits (expected 3, 4, 6 or 8)", s, n)),
        };

        let value = u32::from_str_radix(&expanded, 16).map_err(|e| e.to_string())?;
        // Six-digit forms carry no alpha and are opaque
        let argb = if expanded.len() == 6 {
            0xFF00_0000 | value
        } else {
            value
        };
        Ok(Color(argb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_value_kinds() {
        assert_eq!(MetaValue::from("x").kind(), ValueKind::String);
        assert_eq!(MetaValue::from(42).kind(), ValueKind::Int);
        assert_eq!(MetaValue::from(true).kind(), ValueKind::Bool);
        assert_eq!(MetaValue::from(1.5f32).kind(), ValueKind::Float);
        assert_eq!(
            MetaValue::from(ResourceToken::new(0x7f01_0000)).kind(),
            ValueKind::Resource
        );
    }

    #[test]
    fn token_displays_as_hex() {
        assert_eq!(ResourceToken::new(0x7f01_0002).to_string(), "0x7f010002");
        assert_eq!(ResourceToken::new(1).to_string(), "0x00000001");
    }

    #[test]
    fn resource_kind_parses_type_names() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.type_name().parse::<ResourceKind>(), Ok(kind));
        }
        assert!("drawable".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn color_formats() {
        assert_eq!("#000".parse::<Color>(), Ok(Color::BLACK));
        assert_eq!("#F000".parse::<Color>(), Ok(Color::BLACK));
        assert_eq!("#000000".parse::<Color>(), Ok(Color::BLACK));
        assert_eq!("#FF000000".parse::<Color>(), Ok(Color::BLACK));
        assert_eq!("#80FF0000".parse::<Color>(), Ok(Color(0x80FF_0000)));
        assert_eq!("#ffffff".parse::<Color>(), Ok(Color::WHITE));
    }

    #[test]
    fn color_rejects_garbage() {
        assert!("000000".parse::<Color>().is_err());
        assert!("#00000".parse::<Color>().is_err());
        assert!("#GG0000".parse::<Color>().is_err());
    }

    #[test]
    fn color_display_round_trip() {
        let color = Color(0x80FF_0000);
        assert_eq!(color.to_string(), "#80FF0000");
        assert_eq!(color.alpha(), 0x80);
    }
}

//! CID font subtype and character collection identifiers.

use std::fmt;

/// CID font subtype of a composite font's descendant.
///
/// Fixed when the font is constructed and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CidFontType {
    /// CIDFontType0: CFF-backed (or non-embedded predefined) CID font.
    #[default]
    Type0,
    /// CIDFontType2: TrueType-backed CID font.
    Type2,
}

impl CidFontType {
    /// The PDF `/Subtype` name of the descendant font.
    pub fn subtype(&self) -> &'static str {
        match self {
            CidFontType::Type0 => "CIDFontType0",
            CidFontType::Type2 => "CIDFontType2",
        }
    }

    /// Parse a descendant `/Subtype` name.
    ///
    /// Returns `None` for anything other than `CIDFontType0`/`CIDFontType2`.
    pub fn from_subtype(name: &str) -> Option<Self> {
        match name {
            "CIDFontType0" => Some(CidFontType::Type0),
            "CIDFontType2" => Some(CidFontType::Type2),
            _ => None,
        }
    }
}

impl fmt::Display for CidFontType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subtype())
    }
}

/// Character collection from a `/CIDSystemInfo` dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CidSystemInfo {
    /// Registry (e.g., "Adobe").
    pub registry: String,
    /// Ordering (e.g., "Japan1", "GB1", "CNS1", "Korea1", "Identity").
    pub ordering: String,
    /// Supplement number.
    pub supplement: i64,
}

impl CidSystemInfo {
    /// Create a system info triple.
    pub fn new(registry: impl Into<String>, ordering: impl Into<String>, supplement: i64) -> Self {
        Self {
            registry: registry.into(),
            ordering: ordering.into(),
            supplement,
        }
    }

    /// `Adobe-Identity-0`, the collection of the Identity CMaps.
    pub fn identity() -> Self {
        Self::new("Adobe", "Identity", 0)
    }

    /// Check if this is an Adobe CJK character collection.
    pub fn is_adobe_cjk(&self) -> bool {
        self.registry == "Adobe"
            && matches!(self.ordering.as_str(), "Japan1" | "GB1" | "CNS1" | "Korea1")
    }

    /// Registry and ordering joined the way predefined CMap resources name
    /// their collection (e.g. `Adobe_Japan1`).
    pub fn collection_key(&self) -> String {
        format!("{}_{}", self.registry, self.ordering)
    }
}

impl fmt::Display for CidSystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.registry, self.ordering, self.supplement)
    }
}

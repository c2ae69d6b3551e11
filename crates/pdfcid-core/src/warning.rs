//! Non-fatal diagnostics raised while encoding, decoding or flushing fonts.
//!
//! Fatal conditions are errors in the font crate; everything that allows
//! best-effort continuation is recorded as a [`FontWarning`].

use std::fmt;

/// Machine-readable warning category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum FontWarningCode {
    /// A decode position had no glyph for any codespace length.
    GlyphNotFound,
    /// Subsetting failed and the full font program was embedded instead.
    SubsetFallback,
    /// A Unicode CMap could not be resolved; Identity was used.
    UnknownCMap,
    /// The descendant font declared an unrecognised `/Subtype`.
    UnknownCidFontType,
    /// A font dictionary entry was malformed and ignored.
    MalformedObject,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl FontWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            FontWarningCode::GlyphNotFound => "GLYPH_NOT_FOUND",
            FontWarningCode::SubsetFallback => "SUBSET_FALLBACK",
            FontWarningCode::UnknownCMap => "UNKNOWN_CMAP",
            FontWarningCode::UnknownCidFontType => "UNKNOWN_CID_FONT_TYPE",
            FontWarningCode::MalformedObject => "MALFORMED_OBJECT",
            FontWarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for FontWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue with optional font and byte-offset context.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontWarning {
    /// Machine-readable warning code.
    pub code: FontWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Font name associated with the warning, if applicable.
    pub font_name: Option<String>,
    /// Byte offset inside a decoded string, if applicable.
    pub offset: Option<usize>,
}

impl FontWarning {
    /// Create a warning with just a description.
    ///
    /// Uses [`FontWarningCode::Other`] as the code.
    pub fn new(description: impl Into<String>) -> Self {
        let desc = description.into();
        Self {
            code: FontWarningCode::Other(desc.clone()),
            description: desc,
            font_name: None,
            offset: None,
        }
    }

    /// Create a warning with a specific code and description.
    pub fn with_code(code: FontWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            font_name: None,
            offset: None,
        }
    }

    /// Attach a font name (builder pattern).
    pub fn for_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = Some(font_name.into());
        self
    }

    /// Attach a byte offset (builder pattern).
    pub fn at_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for FontWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(ref font_name) = self.font_name {
            write!(f, " [font {font_name}]")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " [offset {offset}]")?;
        }
        Ok(())
    }
}

//! Glyphs and windowed glyph sequences.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A single glyph as seen by the composite font encoder.
///
/// `code` is the glyph identifier inside the font (the CID for composite
/// fonts). A non-positive code marks a `.notdef` substitute or sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    /// Glyph identifier (CID).
    pub code: i32,
    /// Advance width in glyph space (1/1000 em).
    pub width: i32,
    /// Primary Unicode scalar value backing this glyph, if known.
    pub unicode: Option<u32>,
    /// Text this glyph stands for. Ligature glyphs carry several characters.
    pub chars: Option<String>,
}

impl Glyph {
    /// Create a glyph whose text is derived from `unicode`.
    pub fn new(code: i32, width: i32, unicode: Option<u32>) -> Self {
        let chars = unicode.and_then(char::from_u32).map(String::from);
        Self {
            code,
            width,
            unicode,
            chars,
        }
    }

    /// Create a glyph with explicit backing text.
    pub fn with_chars(code: i32, width: i32, unicode: Option<u32>, chars: impl Into<String>) -> Self {
        Self {
            code,
            width,
            unicode,
            chars: Some(chars.into()),
        }
    }

    /// A substitute built from the font's `.notdef` outline that still
    /// remembers the codepoint it replaces.
    pub fn substitute(notdef: &Glyph, unicode: u32) -> Self {
        Self::new(notdef.code, notdef.width, Some(unicode))
    }

    /// The placeholder produced for undecodable input: code 0, no text.
    pub fn sentinel(width: i32) -> Self {
        Self {
            code: 0,
            width,
            unicode: None,
            chars: None,
        }
    }

    /// Whether this glyph is `.notdef` or a substitute for it.
    pub fn is_notdef(&self) -> bool {
        self.code <= 0
    }

    /// Whether this glyph carries text usable for reverse mapping.
    pub fn has_chars(&self) -> bool {
        self.chars.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Whether the glyph stands for whitespace or a non-printable character.
    pub fn is_whitespace_or_non_printable(&self) -> bool {
        match self.unicode.and_then(char::from_u32) {
            Some(ch) => ch.is_whitespace() || ch.is_control() || is_format_char(ch),
            None => false,
        }
    }
}

/// Default-ignorable format characters (soft hyphen, joiners, marks, BOM).
fn is_format_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
    )
}

/// An ordered glyph sequence with a `[start, end)` window.
///
/// Cloning and sub-slicing share the backing storage.
#[derive(Debug, Clone)]
pub struct GlyphLine {
    glyphs: Arc<[Glyph]>,
    start: usize,
    end: usize,
}

impl GlyphLine {
    /// Create a line covering all of `glyphs`.
    pub fn new(glyphs: Vec<Glyph>) -> Self {
        let end = glyphs.len();
        Self {
            glyphs: glyphs.into(),
            start: 0,
            end,
        }
    }

    /// A narrower view, with `start`/`end` relative to this window.
    ///
    /// Bounds are clamped to the current window.
    pub fn sub_line(&self, start: usize, end: usize) -> GlyphLine {
        let end = (self.start + end).min(self.end);
        let start = (self.start + start).min(end);
        GlyphLine {
            glyphs: Arc::clone(&self.glyphs),
            start,
            end,
        }
    }

    /// Window start in the backing sequence.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Window end (exclusive) in the backing sequence.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Glyphs inside the window.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs[self.start..self.end]
    }

    /// Glyph at a window-relative index.
    pub fn get(&self, index: usize) -> Option<&Glyph> {
        self.glyphs().get(index)
    }

    /// Sum of advance widths inside the window.
    pub fn width(&self) -> i64 {
        self.glyphs().iter().map(|g| i64::from(g.width)).sum()
    }

    /// Concatenated text of the glyphs inside the window.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl Deref for GlyphLine {
    type Target = [Glyph];

    fn deref(&self) -> &[Glyph] {
        self.glyphs()
    }
}

impl PartialEq for GlyphLine {
    fn eq(&self, other: &Self) -> bool {
        self.glyphs() == other.glyphs()
    }
}

impl Eq for GlyphLine {}

impl fmt::Display for GlyphLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for glyph in self.glyphs() {
            if let Some(chars) = &glyph.chars {
                f.write_str(chars)?;
            }
        }
        Ok(())
    }
}

impl From<Vec<Glyph>> for GlyphLine {
    fn from(glyphs: Vec<Glyph>) -> Self {
        GlyphLine::new(glyphs)
    }
}

impl FromIterator<Glyph> for GlyphLine {
    fn from_iter<I: IntoIterator<Item = Glyph>>(iter: I) -> Self {
        GlyphLine::new(iter.into_iter().collect())
    }
}

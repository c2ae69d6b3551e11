//! Font programs: the glyph databases behind a composite font.
//!
//! [`FontProgram`] is the capability set the encoder consumes. Three
//! implementations exist: [`TrueTypeProgram`] for embedded TrueType/OpenType
//! binaries, [`PredefinedCidFont`] for non-embedded CJK fonts and
//! [`DocumentFontProgram`] for fonts reconstructed from an existing PDF.

mod document;
mod predefined;
mod subset;
mod truetype;

use std::collections::BTreeMap;
use std::fmt;

use pdfcid_core::{CidSystemInfo, Glyph};

use crate::error::FontError;

pub use document::DocumentFontProgram;
pub use predefined::PredefinedCidFont;
pub use subset::subset_truetype;
pub use truetype::TrueTypeProgram;

/// Width assumed for glyphs without explicit metrics (one em).
pub const DEFAULT_WIDTH: i32 = 1000;

/// Default ascent for CID fonts when not specified.
pub const DEFAULT_ASCENT: i32 = 880;

/// Default descent for CID fonts when not specified.
pub const DEFAULT_DESCENT: i32 = -120;

/// Font-wide metrics in glyph space (1/1000 em).
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Number of glyphs in the program.
    pub glyph_count: u32,
    /// Width implied for CIDs that the `/W` array omits.
    pub default_width: i32,
    /// Font bounding box `[llx lly urx ury]`.
    pub bbox: [i32; 4],
    pub ascent: i32,
    pub descent: i32,
    pub cap_height: i32,
    /// Italic angle in degrees counter-clockwise from vertical.
    pub italic_angle: f32,
    /// Dominant vertical stem width.
    pub stem_v: i32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            glyph_count: 0,
            default_width: DEFAULT_WIDTH,
            bbox: [-200, DEFAULT_DESCENT - 100, 1000, 900],
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            cap_height: 700,
            italic_angle: 0.0,
            stem_v: 80,
        }
    }
}

/// Font descriptor `/Flags` bits used by this crate.
pub mod flags {
    pub const FIXED_PITCH: i32 = 1 << 0;
    pub const SERIF: i32 = 1 << 1;
    pub const SYMBOLIC: i32 = 1 << 2;
    pub const NONSYMBOLIC: i32 = 1 << 5;
    pub const ITALIC: i32 = 1 << 6;
    pub const FORCE_BOLD: i32 = 1 << 18;
}

/// Glyph database keyed by code, with metrics and raw program bytes.
///
/// Glyph codes are CIDs as seen by the composite font.
pub trait FontProgram: fmt::Debug {
    /// PostScript-style font name.
    fn font_name(&self) -> &str;

    /// Style suffix appended to predefined font names (e.g. "Bold").
    fn style(&self) -> Option<&str> {
        None
    }

    /// Glyph for a Unicode scalar value.
    fn glyph_by_unicode(&self, unicode: u32) -> Option<Glyph>;

    /// Glyph for a font code (CID).
    fn glyph_by_code(&self, code: u32) -> Option<Glyph>;

    /// Whether the program uses a font-specific (symbol) encoding.
    fn is_symbolic(&self) -> bool {
        false
    }

    /// Whether outlines are CFF (embedded as `FontFile3`).
    fn is_cff(&self) -> bool {
        false
    }

    /// Whether the licensing bits allow embedding.
    fn allows_embedding(&self) -> bool {
        true
    }

    /// Whether the program was extracted from a font collection.
    fn is_collection_member(&self) -> bool {
        false
    }

    /// The active cmap subtable: character code → glyph id.
    fn active_code_to_glyph_map(&self) -> BTreeMap<u32, u32> {
        BTreeMap::new()
    }

    /// The complete program binary, `None` for fonts that are never embedded.
    fn raw_bytes(&self) -> Option<&[u8]>;

    /// Reduce the program to `used` glyph ids (plus composite dependencies
    /// when `close_composites` is set).
    fn subset(&self, used: &[u32], close_composites: bool) -> Result<Vec<u8>, FontError>;

    fn metrics(&self) -> &FontMetrics;

    /// Font descriptor `/Flags`.
    fn pdf_flags(&self) -> i32 {
        if self.is_symbolic() {
            flags::SYMBOLIC
        } else {
            flags::NONSYMBOLIC
        }
    }

    /// The 12-byte PANOSE classification (sFamilyClass + panose), if known.
    fn panose(&self) -> Option<&[u8]> {
        None
    }

    /// Character collection of a predefined CJK font.
    fn registry(&self) -> Option<&CidSystemInfo> {
        None
    }
}

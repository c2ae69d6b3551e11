//! pdfcid-font: composite (Type0/CID) fonts for PDF on top of `lopdf`.
//!
//! This crate turns Unicode text into font-specific byte codes for content
//! streams, decodes such codes back to text, and writes the objects of an
//! embedded composite font: the (subset) font program, font descriptor,
//! `/W` width array, `/ToUnicode` CMap and `/CIDSet` bitmap. It depends on
//! pdfcid-core for shared data types.
//!
//! ```no_run
//! use lopdf::Document;
//! use pdfcid_font::{CompositeFontEncoder, FontOptions, TrueTypeProgram};
//!
//! # fn main() -> Result<(), pdfcid_font::FontError> {
//! let program = TrueTypeProgram::open("NotoSans-Regular.ttf", 0)?;
//! let mut font = CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::default())?;
//! let mut doc = Document::with_version("1.7");
//! let shown = font.encode("Hello");
//! let font_id = font.flush(&mut doc)?;
//! # let _ = (shown, font_id);
//! # Ok(())
//! # }
//! ```

pub mod cmap;
pub mod encoder;
pub mod error;
pub mod program;
pub mod registry;

mod log;
mod objects;

pub use cmap::{CMapTable, CodespaceRange, IdentityCMap, ParsedCMap, ToUnicodeCMap, UnicodeMap};
pub use encoder::{CompositeFontEncoder, WidthArray, cid_set_bytes};
pub use error::FontError;
pub use pdfcid_core;
pub use pdfcid_core::{
    CidFontType, CidSystemInfo, FontOptions, FontWarning, FontWarningCode, Glyph, GlyphLine,
    PdfVersion,
};
pub use program::{
    DocumentFontProgram, FontMetrics, FontProgram, PredefinedCidFont, TrueTypeProgram,
    subset_truetype,
};
pub use registry::FontRegistry;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
pub(crate) mod test_font;

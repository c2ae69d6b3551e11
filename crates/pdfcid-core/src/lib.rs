//! pdfcid-core: Backend-independent data types for composite font handling.
//!
//! This crate provides the foundational types ([`Glyph`], [`GlyphLine`],
//! [`CidSystemInfo`], [`PdfVersion`]) and the diagnostics/configuration
//! types ([`FontWarning`], [`FontOptions`]) used by the pdfcid font engine.
//! It has no PDF backend dependency.

pub mod cid;
pub mod encoding;
pub mod glyph;
pub mod options;
pub mod version;
pub mod warning;

pub use cid::{CidFontType, CidSystemInfo};
pub use encoding::PdfDocEncoding;
pub use glyph::{Glyph, GlyphLine};
pub use options::{FontOptions, compact_ranges};
pub use version::PdfVersion;
pub use warning::{FontWarning, FontWarningCode};

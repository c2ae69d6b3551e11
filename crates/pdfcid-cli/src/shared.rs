use std::fmt::Write as _;
use std::path::Path;

use lopdf::Document;
use pdfcid_font::{FontWarning, TrueTypeProgram};

/// Load face `index` of a font file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is missing
/// or is not a readable TrueType/OpenType font.
pub fn open_font(file: &Path, index: u32) -> Result<TrueTypeProgram, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    TrueTypeProgram::open(file, index).map_err(|e| {
        eprintln!("Error: failed to load font: {e}");
        1
    })
}

/// Open a PDF file with user-friendly error messages.
pub fn open_pdf(file: &Path) -> Result<Document, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    Document::load(file).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Upper-case hex without separators, e.g. `00020003`.
pub fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02X}");
    }
    out
}

/// Print font warnings to stderr, one per line.
pub fn print_warnings(warnings: &[FontWarning]) {
    for warning in warnings {
        eprintln!("Warning: {warning}");
    }
}

//! Error types for the composite font engine.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Every variant is fatal
//! for the operation that raised it; recoverable conditions are reported as
//! [`FontWarning`](pdfcid_core::FontWarning)s instead.

use thiserror::Error;

/// Fatal errors raised by font construction, width building and flush.
#[derive(Debug, Error)]
pub enum FontError {
    /// An embedded font was requested with a CMap other than Identity-H/V.
    #[error("unsupported CMap for embedded font: {0}")]
    UnsupportedCMap(String),

    /// The font program's licensing bits forbid embedding.
    #[error("font {0} cannot be embedded due to licensing restrictions")]
    EmbeddingRestricted(String),

    /// The (font, CMap) pair is not a registered predefined CID font.
    #[error("font {font} with {cmap} encoding is not a CJK font")]
    NotCjkFont { font: String, cmap: String },

    /// No usable font program or Unicode mapping could be resolved for a
    /// font dictionary read from a document.
    #[error("cannot recognise document font {font} with {encoding} encoding")]
    UnresolvableFont { font: String, encoding: String },

    /// The requested operation is not implemented (vertical widths).
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// A named CMap resource is not registered.
    #[error("CMap resource not found: {0}")]
    CMapNotFound(String),

    /// Malformed CMap program text.
    #[error("CMap parse error: {0}")]
    Parse(String),

    /// Malformed or unsupported font program binary.
    #[error("font program error: {0}")]
    Program(String),

    /// The subsetting primitive could not produce a reduced program.
    #[error("subsetting failed: {0}")]
    Subset(String),

    /// A font dictionary read from a document is structurally invalid.
    #[error("invalid font dictionary: {0}")]
    Dictionary(String),

    /// Error from the PDF object layer.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Error reading font or CMap data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_cmap_message() {
        let err = FontError::UnsupportedCMap("UniJIS-UCS2-H".to_string());
        assert_eq!(
            err.to_string(),
            "unsupported CMap for embedded font: UniJIS-UCS2-H"
        );
    }

    #[test]
    fn not_cjk_font_message() {
        let err = FontError::NotCjkFont {
            font: "Helvetica".to_string(),
            cmap: "UniGB-UCS2-H".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "font Helvetica with UniGB-UCS2-H encoding is not a CJK font"
        );
    }

    #[test]
    fn not_implemented_message() {
        let err = FontError::NotImplemented("vertical writing width array");
        assert_eq!(err.to_string(), "not implemented: vertical writing width array");
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "font missing");
        let err: FontError = io_err.into();
        assert!(matches!(err, FontError::Io(_)));
        assert!(err.to_string().contains("font missing"));
    }

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(FontError::Subset("bad loca".to_string()));
        assert_eq!(err.to_string(), "subsetting failed: bad loca");
    }
}

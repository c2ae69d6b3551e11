//! PDF revision numbers.

use std::fmt;

/// A PDF revision such as `1.7` or `2.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl PdfVersion {
    pub const PDF_1_4: PdfVersion = PdfVersion::new(1, 4);
    pub const PDF_1_7: PdfVersion = PdfVersion::new(1, 7);
    pub const PDF_2_0: PdfVersion = PdfVersion::new(2, 0);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Parse `"1.7"`, `"2.0"` or a `%PDF-x.y` header line.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix("%PDF-").unwrap_or(text);
        let (major, minor) = text.split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    /// Whether this revision deprecates the `/CIDSet` descriptor entry.
    pub fn deprecates_cid_set(&self) -> bool {
        *self >= Self::PDF_2_0
    }
}

impl Default for PdfVersion {
    fn default() -> Self {
        Self::PDF_1_7
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_and_header() {
        assert_eq!(PdfVersion::parse("1.7"), Some(PdfVersion::PDF_1_7));
        assert_eq!(PdfVersion::parse("%PDF-2.0"), Some(PdfVersion::PDF_2_0));
        assert_eq!(PdfVersion::parse(" 1.4 "), Some(PdfVersion::PDF_1_4));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(PdfVersion::parse("seven"), None);
        assert_eq!(PdfVersion::parse("1"), None);
        assert_eq!(PdfVersion::parse("1.x"), None);
    }

    #[test]
    fn ordering_and_cid_set_rule() {
        assert!(PdfVersion::PDF_1_7 < PdfVersion::PDF_2_0);
        assert!(!PdfVersion::PDF_1_7.deprecates_cid_set());
        assert!(PdfVersion::PDF_2_0.deprecates_cid_set());
        assert!(PdfVersion::new(2, 1).deprecates_cid_set());
    }

    #[test]
    fn display() {
        assert_eq!(PdfVersion::new(1, 5).to_string(), "1.5");
    }
}

//! Serialization checks for the `serde` feature.

#![cfg(feature = "serde")]

use pdfcid_core::{CidFontType, CidSystemInfo, FontWarning, FontWarningCode, Glyph, PdfVersion};

#[test]
fn glyph_serializes_fields() {
    let glyph = Glyph::with_chars(120, 550, Some(0xFB01), "fi");
    let json = serde_json::to_value(&glyph).unwrap();
    assert_eq!(json["code"], 120);
    assert_eq!(json["width"], 550);
    assert_eq!(json["chars"], "fi");
    let back: Glyph = serde_json::from_value(json).unwrap();
    assert_eq!(back, glyph);
}

#[test]
fn warning_code_is_tagged() {
    let warning = FontWarning::with_code(FontWarningCode::SubsetFallback, "bad glyf").for_font("F");
    let json = serde_json::to_value(&warning).unwrap();
    assert_eq!(json["code"]["type"], "SubsetFallback");
    assert_eq!(json["font_name"], "F");
}

#[test]
fn system_info_and_version() {
    let info = CidSystemInfo::new("Adobe", "Japan1", 6);
    let json = serde_json::to_string(&info).unwrap();
    assert!(json.contains("\"ordering\":\"Japan1\""));

    let version: PdfVersion = serde_json::from_str(r#"{"major":2,"minor":0}"#).unwrap();
    assert_eq!(version, PdfVersion::PDF_2_0);

    let kind = serde_json::to_string(&CidFontType::Type2).unwrap();
    assert_eq!(kind, "\"Type2\"");
}

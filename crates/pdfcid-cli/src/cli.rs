use std::ops::RangeInclusive;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Encode text with composite (Type0/CID) fonts, embed them in PDFs and
/// inspect the composite fonts of existing documents.
#[derive(Debug, Parser)]
#[command(name = "pdfcid", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Encode text into font codes and print them as hex
    Encode {
        /// Path to a TrueType/OpenType font or font collection
        #[arg(long, value_name = "FILE")]
        font: PathBuf,

        /// Face index inside a font collection
        #[arg(long, default_value_t = 0)]
        index: u32,

        /// Encoding CMap (Identity-H or Identity-V)
        #[arg(long, default_value = "Identity-H")]
        cmap: String,

        /// Text to encode
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Write a one-page PDF showing text with an embedded composite font
    Embed {
        /// Path to a TrueType/OpenType font or font collection
        #[arg(long, value_name = "FILE")]
        font: PathBuf,

        /// Face index inside a font collection
        #[arg(long, default_value_t = 0)]
        index: u32,

        /// Embed the whole font program instead of a subset
        #[arg(long)]
        no_subset: bool,

        /// Unicode range kept when not subsetting (e.g. '20-7E'); repeatable
        #[arg(long = "range", value_name = "LO-HI", value_parser = parse_unicode_range)]
        ranges: Vec<RangeInclusive<u32>>,

        /// PDF version of the output document
        #[arg(long, default_value = "1.7")]
        pdf_version: String,

        /// Font size in points
        #[arg(long, default_value_t = 24.0)]
        size: f32,

        /// Output PDF path
        #[arg(long, short, value_name = "OUT")]
        output: PathBuf,

        /// Text to show
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Decode the text shown with composite fonts in a PDF
    Inspect {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = InspectFormat::Text)]
        format: InspectFormat,
    },
}

/// Output format for the inspect subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectFormat {
    Text,
    Json,
}

/// Parse a hexadecimal code point range such as `20-7E` or `U+4E00-U+9FFF`.
///
/// A single code point (`41`) is a one-element range.
pub fn parse_unicode_range(s: &str) -> Result<RangeInclusive<u32>, String> {
    fn code_point(part: &str) -> Result<u32, String> {
        let digits = part
            .trim()
            .trim_start_matches("U+")
            .trim_start_matches("u+")
            .trim_start_matches("0x");
        u32::from_str_radix(digits, 16).map_err(|_| format!("invalid code point: '{part}'"))
    }

    let (lo, hi) = match s.split_once('-') {
        Some((lo, hi)) => (code_point(lo)?, code_point(hi)?),
        None => {
            let cp = code_point(s)?;
            (cp, cp)
        }
    };
    if lo > hi {
        return Err(format!("range start exceeds end: '{s}'"));
    }
    Ok(lo..=hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- range parsing ---

    #[test]
    fn parses_hex_range() {
        assert_eq!(parse_unicode_range("20-7E").unwrap(), 0x20..=0x7E);
    }

    #[test]
    fn parses_prefixed_range() {
        assert_eq!(
            parse_unicode_range("U+4E00-U+9FFF").unwrap(),
            0x4E00..=0x9FFF
        );
    }

    #[test]
    fn single_code_point() {
        assert_eq!(parse_unicode_range("41").unwrap(), 0x41..=0x41);
    }

    #[test]
    fn rejects_reversed_range() {
        assert!(parse_unicode_range("7E-20").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_unicode_range("zz").is_err());
    }

    // --- argument parsing ---

    #[test]
    fn embed_collects_repeated_ranges() {
        let cli = Cli::try_parse_from([
            "pdfcid", "embed", "--font", "f.ttf", "--no-subset", "--range", "20-7E", "--range",
            "4E00-4E2D", "-o", "out.pdf", "Hi",
        ])
        .unwrap();
        match cli.command {
            Commands::Embed {
                ranges, no_subset, ..
            } => {
                assert!(no_subset);
                assert_eq!(ranges, vec![0x20..=0x7E, 0x4E00..=0x4E2D]);
            }
            other => panic!("expected embed, got {other:?}"),
        }
    }

    #[test]
    fn inspect_defaults_to_text() {
        let cli = Cli::try_parse_from(["pdfcid", "inspect", "doc.pdf"]).unwrap();
        match cli.command {
            Commands::Inspect { format, .. } => assert_eq!(format, InspectFormat::Text),
            other => panic!("expected inspect, got {other:?}"),
        }
    }
}

use std::ops::RangeInclusive;
use std::path::Path;

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use pdfcid_font::{CompositeFontEncoder, FontOptions, PdfVersion};

use crate::shared::{hex_string, open_font, print_warnings};

/// Arguments of the embed subcommand.
pub struct EmbedArgs<'a> {
    pub font: &'a Path,
    pub index: u32,
    pub subset: bool,
    pub ranges: &'a [RangeInclusive<u32>],
    pub pdf_version: &'a str,
    pub size: f32,
    pub output: &'a Path,
    pub text: &'a str,
}

pub fn run(args: &EmbedArgs<'_>) -> Result<(), i32> {
    let Some(version) = PdfVersion::parse(args.pdf_version) else {
        eprintln!("Error: invalid PDF version: '{}'", args.pdf_version);
        return Err(1);
    };

    let program = open_font(args.font, args.index)?;
    let options = FontOptions {
        subset: args.subset,
        subset_ranges: (!args.ranges.is_empty()).then(|| args.ranges.to_vec()),
        ..FontOptions::default()
    };
    let mut encoder =
        CompositeFontEncoder::embedded(program, "Identity-H", options).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?;

    let mut doc = Document::with_version(version.to_string());
    let font_id = encoder.object_id(&mut doc);
    let shown = encoder.encode(args.text);
    let content = format!(
        "BT /F1 {} Tf 72 720 Td <{}> Tj ET",
        args.size,
        hex_string(&shown)
    );
    add_page(&mut doc, font_id, content.into_bytes());

    encoder.flush(&mut doc).map_err(|e| {
        eprintln!("Error: failed to write font: {e}");
        1
    })?;
    print_warnings(encoder.warnings());

    doc.save(args.output).map_err(|e| {
        eprintln!("Error: failed to write {}: {e}", args.output.display());
        1
    })?;
    tracing::debug!(output = %args.output.display(), cids = encoder.used_cids().len(), "PDF written");
    println!("wrote {}", args.output.display());
    Ok(())
}

/// Add a US Letter page showing `content` with the font as `/F1`.
fn add_page(doc: &mut Document, font_id: ObjectId, content: Vec<u8>) {
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
        "Contents" => Object::Reference(content_id),
        "Resources" => dictionary! {
            "Font" => dictionary! {
                "F1" => Object::Reference(font_id),
            },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
}

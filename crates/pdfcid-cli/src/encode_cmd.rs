use std::path::Path;

use pdfcid_font::{CompositeFontEncoder, FontOptions};

use crate::shared::{hex_string, open_font, print_warnings};

pub fn run(font: &Path, index: u32, cmap: &str, text: &str) -> Result<(), i32> {
    let program = open_font(font, index)?;
    let mut encoder =
        CompositeFontEncoder::embedded(program, cmap, FontOptions::default()).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?;

    let bytes = encoder.encode(text);
    let cids: Vec<String> = encoder.used_cids().iter().map(u32::to_string).collect();

    println!("<{}>", hex_string(&bytes));
    println!("cids: {}", cids.join(" "));
    print_warnings(encoder.warnings());
    Ok(())
}

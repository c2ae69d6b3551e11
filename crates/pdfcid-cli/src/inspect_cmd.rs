use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfcid_font::{CompositeFontEncoder, FontProgram, FontRegistry, FontWarning};
use serde::Serialize;

use crate::cli::InspectFormat;
use crate::content::{shown_strings, tokenize};
use crate::shared::open_pdf;

/// Text decoded from consecutive strings shown with one composite font.
#[derive(Debug, Serialize)]
struct TextRun {
    resource: String,
    font: String,
    text: String,
}

#[derive(Debug, Serialize)]
struct PageReport {
    page: u32,
    runs: Vec<TextRun>,
    warnings: Vec<FontWarning>,
}

pub fn run(file: &Path, format: InspectFormat) -> Result<(), i32> {
    let doc = open_pdf(file)?;
    let registry = FontRegistry::new();
    let mut fonts: HashMap<ObjectId, Option<CompositeFontEncoder>> = HashMap::new();

    for (page_number, page_id) in doc.get_pages() {
        let report = inspect_page(&doc, page_number, page_id, &registry, &mut fonts)?;
        match format {
            InspectFormat::Text => {
                println!("--- Page {page_number} ---");
                for run in &report.runs {
                    println!("{} ({}): {}", run.resource, run.font, run.text);
                }
                for warning in &report.warnings {
                    eprintln!("Warning: page {page_number}: {warning}");
                }
            }
            InspectFormat::Json => {
                let json = serde_json::to_string(&report).map_err(|e| {
                    eprintln!("Error: failed to serialize page {page_number}: {e}");
                    1
                })?;
                println!("{json}");
            }
        }
    }

    Ok(())
}

fn inspect_page(
    doc: &Document,
    page_number: u32,
    page_id: ObjectId,
    registry: &FontRegistry,
    fonts: &mut HashMap<ObjectId, Option<CompositeFontEncoder>>,
) -> Result<PageReport, i32> {
    let content = page_content(doc, page_id).map_err(|e| {
        eprintln!("Error reading page {page_number}: {e}");
        1
    })?;
    let ops = tokenize(&content).map_err(|e| {
        eprintln!("Error parsing content of page {page_number}: {e}");
        1
    })?;
    let resources = page_font_ids(doc, page_id);

    let mut runs: Vec<TextRun> = Vec::new();
    let mut warnings = Vec::new();
    for shown in shown_strings(&ops) {
        let Some(resource) = shown.font else {
            continue;
        };
        let Some(&font_id) = resources.get(&resource) else {
            continue;
        };
        let entry = fonts.entry(font_id).or_insert_with(|| {
            if !is_type0(doc, font_id) {
                return None;
            }
            CompositeFontEncoder::from_document(doc, font_id, registry)
                .inspect_err(|e| tracing::warn!(font = %resource, "skipping font: {e}"))
                .ok()
        });
        let Some(encoder) = entry.as_mut() else {
            continue;
        };

        let text = encoder.decode(&shown.bytes);
        warnings.extend(encoder.take_warnings());
        match runs.last_mut() {
            Some(last) if last.resource == resource => last.text.push_str(&text),
            _ => runs.push(TextRun {
                font: encoder.program().font_name().to_string(),
                resource,
                text,
            }),
        }
    }

    Ok(PageReport {
        page: page_number,
        runs,
        warnings,
    })
}

/// Concatenated, decompressed `/Contents` of a page.
fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>, lopdf::Error> {
    let page = doc.get_dictionary(page_id)?;
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };
    let ids: Vec<ObjectId> = match contents {
        Object::Reference(id) => vec![*id],
        Object::Array(items) => items.iter().filter_map(|i| i.as_reference().ok()).collect(),
        _ => Vec::new(),
    };

    let mut content = Vec::new();
    for id in ids {
        let stream = doc.get_object(id)?.as_stream()?;
        if !content.is_empty() {
            content.push(b' ');
        }
        if stream.dict.get(b"Filter").is_ok() {
            content.extend(stream.decompressed_content()?);
        } else {
            content.extend_from_slice(&stream.content);
        }
    }
    Ok(content)
}

fn is_type0(doc: &Document, font_id: ObjectId) -> bool {
    doc.get_dictionary(font_id)
        .ok()
        .and_then(|font| font.get(b"Subtype").ok())
        .and_then(|subtype| subtype.as_name().ok())
        == Some(b"Type0".as_slice())
}

/// `/Font` resource names of a page mapped to their font objects, with
/// resources inherited from ancestor page tree nodes.
fn page_font_ids(doc: &Document, page_id: ObjectId) -> BTreeMap<String, ObjectId> {
    let mut fonts = BTreeMap::new();
    let Some(font_dict) = inherited_resources(doc, page_id)
        .and_then(|resources| resolve(doc, resources.get(b"Font").ok()?).as_dict().ok())
    else {
        return fonts;
    };
    for (name, value) in font_dict.iter() {
        if let Object::Reference(id) = value {
            fonts.insert(String::from_utf8_lossy(name).into_owned(), *id);
        }
    }
    fonts
}

fn inherited_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    // Page trees are shallow; the bound guards against Parent cycles.
    for _ in 0..64 {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve(doc, resources).as_dict().ok();
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

//! Small helpers over `lopdf` objects shared by the reading and writing paths.

use lopdf::{Dictionary, Document, Object, StringFormat};

/// Resolve an indirect reference to the actual object.
pub(crate) fn resolve_object<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Look up a dictionary entry, following one level of indirection.
pub(crate) fn resolved_entry<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    dict.get(key).ok().map(|o| resolve_object(doc, o))
}

/// Resolve a dictionary entry that must itself be a dictionary.
pub(crate) fn resolved_dict<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    resolved_entry(doc, dict, key).and_then(|o| o.as_dict().ok())
}

/// Read a name entry as a string.
pub(crate) fn name_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    resolved_entry(doc, dict, key)
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).into_owned())
}

/// Read a string entry (literal or hex) as text.
pub(crate) fn text_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match resolved_entry(doc, dict, key)? {
        Object::String(s, _) => Some(String::from_utf8_lossy(s).into_owned()),
        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

/// Convert a lopdf object to f64.
pub(crate) fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

/// Convert a lopdf object to u32.
pub(crate) fn object_to_u32(obj: &Object) -> Option<u32> {
    match obj {
        Object::Integer(i) => u32::try_from(*i).ok(),
        Object::Real(f) if *f >= 0.0 => Some(*f as u32),
        _ => None,
    }
}

/// Build a literal PDF string object.
pub(crate) fn literal(text: &str) -> Object {
    Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
}

/// Stream content with filters removed when the stream is filtered.
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone())
    } else {
        stream.content.clone()
    }
}

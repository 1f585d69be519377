//! Small helpers over lopdf objects

use lopdf::{Dictionary, Document, Object};

/// Upper bound on reference chains and parent walks
pub(crate) const MAX_DEPTH: usize = 32;

/// Objects whose `/Type` is `/Page`, for documents with a broken page tree
pub(crate) fn count_page_objects(doc: &Document) -> usize {
    doc.objects
        .values()
        .filter_map(|obj| obj.as_dict().ok())
        .filter(|dict| {
            matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name.as_slice() == b"Page")
        })
        .count()
}

/// Follow indirect references until a direct object is reached
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Resolve `key` in `dict` to a direct object
pub(crate) fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|obj| resolve(doc, obj))
}

pub(crate) fn get_dict<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    match get(doc, dict, key)? {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

pub(crate) fn get_array<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Vec<Object>> {
    match get(doc, dict, key)? {
        Object::Array(arr) => Some(arr),
        _ => None,
    }
}

pub(crate) fn get_name<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    match get(doc, dict, key)? {
        Object::Name(name) => Some(name.as_slice()),
        _ => None,
    }
}

pub(crate) fn get_int(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<i64> {
    match get(doc, dict, key)? {
        Object::Integer(n) => Some(*n),
        Object::Real(r) => Some(*r as i64),
        _ => None,
    }
}

pub(crate) fn get_text(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match get(doc, dict, key)? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(n) => Some(*n as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Decode a PDF string: UTF-16BE with BOM, then UTF-8, then Latin-1
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&units) {
            return s;
        }
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Four numbers of a rectangle array, in array order
pub(crate) fn rect(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    match resolve(doc, obj)? {
        Object::Array(arr) if arr.len() >= 4 => {
            let mut out = [0.0; 4];
            for (slot, item) in out.iter_mut().zip(arr.iter()) {
                *slot = number(resolve(doc, item)?)?;
            }
            Some(out)
        }
        _ => None,
    }
}

/// Document catalog from the trailer
pub(crate) fn catalog(doc: &Document) -> Option<&Dictionary> {
    match resolve(doc, doc.trailer.get(b"Root").ok()?)? {
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}

//! Document-access backends
//!
//! Two interchangeable implementations of [`DocumentAccess`]: a
//! widget-aware one on lopdf and a text-only one for documents whose form
//! structure cannot be read. [`open_document`] picks between them.

pub mod content;
pub mod document;
pub mod error;
mod forms;
mod objects;
pub mod text_only;

pub use document::PdfFormDocument;
pub use error::DecodeError;
pub use text_only::TextOnlyDocument;

use lopdf::Document;
use shared_types::DocumentAccess;
use tracing::{debug, info, warn};

/// Page count from the PDF structure when lopdf can still load the file
pub fn page_count_hint(data: &[u8]) -> Option<usize> {
    let doc = Document::load_mem(data).ok()?;
    let count = match doc.get_pages().len() {
        0 => objects::count_page_objects(&doc),
        n => n,
    };
    (count > 0).then_some(count)
}

/// Decode `data` with the richest backend that can read it
pub fn open_document(
    data: &[u8],
    source: &str,
) -> Result<Box<dyn DocumentAccess + Send + Sync>, DecodeError> {
    let parse_error = match PdfFormDocument::from_bytes(data, source) {
        Ok(doc) => return Ok(Box::new(doc)),
        Err(e) => e,
    };
    warn!(source, error = %parse_error, "Structured decode failed, trying text extraction");

    match document::extract_text(data) {
        Ok(text) if !text.trim().is_empty() => {
            info!(source, "Falling back to text-only analysis");
            let doc = TextOnlyDocument::new(source, text);
            match page_count_hint(data) {
                Some(pages) => {
                    debug!(source, pages, "Page count taken from document structure");
                    Ok(Box::new(doc.with_page_count(pages)))
                }
                None => Ok(Box::new(doc)),
            }
        }
        Ok(_) => Err(parse_error),
        Err(e) => Err(DecodeError::NoText(format!("{parse_error}; {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lopdf::{dictionary, Object};

    /// Three `/Page` objects; `/Kids` reaches them only when `linked`
    fn three_page_pdf(linked: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_ids: Vec<_> = (0..3)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => Object::Reference(pages_id),
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                })
            })
            .collect();
        let kids: Vec<Object> = if linked {
            page_ids.iter().map(|&id| Object::Reference(id)).collect()
        } else {
            Vec::new()
        };
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => 3,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_open_document_rejects_garbage() {
        let result = open_document(b"%PDF-garbage", "junk.pdf");
        assert!(result.is_err());
        assert_eq!(page_count_hint(b"%PDF-garbage"), None);
    }

    #[test]
    fn test_page_count_hint_reads_page_tree() {
        assert_eq!(page_count_hint(&three_page_pdf(true)), Some(3));
    }

    #[test]
    fn test_page_count_hint_survives_broken_page_tree() {
        assert_eq!(page_count_hint(&three_page_pdf(false)), Some(3));
    }
}

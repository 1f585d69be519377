//! Widget-aware document backend on lopdf

use std::collections::BTreeMap;

use lopdf::{Document, Object};
use shared_types::{
    AccessError, DigitalSignature, DocumentAccess, LineSegment, PageGraphics, TextBlock,
    WidgetInfo,
};
use tracing::{debug, warn};

use crate::content::{page_layout, PageLayout};
use crate::error::DecodeError;
use crate::forms::{enumerate_widgets, name_tree_len};
use crate::objects;

/// A parsed PDF with its form, layout and metadata facts
///
/// Facts are extracted once at load time; accessors only read.
pub struct PdfFormDocument {
    source: String,
    raw_text: String,
    metadata: BTreeMap<String, String>,
    layouts: Vec<Result<PageLayout, String>>,
    page_actions: Vec<bool>,
    document_actions: bool,
    widgets: Vec<WidgetInfo>,
    signatures: Vec<DigitalSignature>,
    embedded_files: usize,
}

impl PdfFormDocument {
    /// Parse `data`; `source` is the URL or path it came from
    pub fn from_bytes(data: &[u8], source: impl Into<String>) -> Result<Self, DecodeError> {
        let doc = Document::load_mem(data).map_err(|e| DecodeError::ParseError(e.to_string()))?;
        Self::from_document(&doc, data, source.into())
    }

    fn from_document(doc: &Document, data: &[u8], source: String) -> Result<Self, DecodeError> {
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(DecodeError::NoPages);
        }

        let mut layouts = Vec::with_capacity(pages.len());
        let mut page_actions = Vec::with_capacity(pages.len());
        for (&page_num, &page_id) in &pages {
            let layout = page_layout(doc, page_id);
            if let Err(e) = &layout {
                warn!(page = page_num, error = %e, "Page content could not be walked");
            }
            layouts.push(layout);
            let has_actions = doc
                .get_dictionary(page_id)
                .map(|page| page.has(b"AA"))
                .unwrap_or(false);
            page_actions.push(has_actions);
        }

        let enumerated = enumerate_widgets(doc, &pages);
        let signatures = enumerated.iter().filter_map(|w| w.signature).collect();
        let widgets = enumerated.into_iter().map(|w| w.info).collect::<Vec<_>>();

        let raw_text = match extract_text(data) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => layout_text(&layouts),
            Err(e) => {
                debug!(error = %e, "pdf-extract failed, using content-stream text");
                layout_text(&layouts)
            }
        };

        let document = Self {
            source,
            raw_text,
            metadata: read_metadata(doc),
            layouts,
            page_actions,
            document_actions: catalog_has_actions(doc),
            widgets,
            signatures,
            embedded_files: embedded_file_count(doc),
        };
        debug!(
            source = %document.source,
            pages = document.layouts.len(),
            widgets = document.widgets.len(),
            "Loaded form document"
        );
        Ok(document)
    }

    fn layout(&self, page: usize) -> Result<&PageLayout, AccessError> {
        match page.checked_sub(1).and_then(|i| self.layouts.get(i)) {
            Some(Ok(layout)) => Ok(layout),
            Some(Err(e)) => Err(AccessError::Extraction(e.clone())),
            None => Err(AccessError::Extraction(format!("page {page} out of range"))),
        }
    }
}

/// pdf-extract text; its panics on unsupported fonts are reported as errors
pub(crate) fn extract_text(data: &[u8]) -> Result<String, String> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("text extraction panicked".to_string()),
    }
}

/// Text from the content-stream walk, one line per block, pages split by form feed
fn layout_text(layouts: &[Result<PageLayout, String>]) -> String {
    layouts
        .iter()
        .map(|layout| match layout {
            Ok(layout) => layout
                .blocks
                .iter()
                .map(|b| b.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Err(_) => String::new(),
        })
        .collect::<Vec<_>>()
        .join("\x0C")
}

fn read_metadata(doc: &Document) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    let Some(Object::Dictionary(info)) = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| objects::resolve(doc, obj))
    else {
        return metadata;
    };
    for (key, value) in info.iter() {
        let text = match objects::resolve(doc, value) {
            Some(Object::String(bytes, _)) => objects::decode_pdf_string(bytes),
            Some(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
            _ => continue,
        };
        let key = String::from_utf8_lossy(key).to_lowercase();
        metadata.insert(key, text.trim().to_string());
    }
    metadata
}

fn catalog_has_actions(doc: &Document) -> bool {
    let Some(catalog) = objects::catalog(doc) else {
        return false;
    };
    if catalog.has(b"OpenAction") || catalog.has(b"AA") {
        return true;
    }
    objects::get_dict(doc, catalog, b"Names")
        .and_then(|names| objects::get_dict(doc, names, b"JavaScript"))
        .map(|js| name_tree_len(doc, js, 0) > 0)
        .unwrap_or(false)
}

fn embedded_file_count(doc: &Document) -> usize {
    objects::catalog(doc)
        .and_then(|catalog| objects::get_dict(doc, catalog, b"Names"))
        .and_then(|names| objects::get_dict(doc, names, b"EmbeddedFiles"))
        .map(|tree| name_tree_len(doc, tree, 0))
        .unwrap_or(0)
}

impl DocumentAccess for PdfFormDocument {
    fn backend_name(&self) -> &'static str {
        "lopdf"
    }

    fn source_locator(&self) -> &str {
        &self.source
    }

    fn raw_text(&self) -> Result<String, AccessError> {
        Ok(self.raw_text.clone())
    }

    fn metadata(&self) -> Result<BTreeMap<String, String>, AccessError> {
        Ok(self.metadata.clone())
    }

    fn page_count(&self) -> Result<usize, AccessError> {
        Ok(self.layouts.len())
    }

    fn widgets(&self) -> Result<Vec<WidgetInfo>, AccessError> {
        Ok(self.widgets.clone())
    }

    fn page_graphics(&self, page: usize) -> Result<PageGraphics, AccessError> {
        self.layout(page).map(|layout| layout.graphics)
    }

    fn page_text_blocks(&self, page: usize) -> Result<Vec<TextBlock>, AccessError> {
        self.layout(page).map(|layout| layout.blocks.clone())
    }

    fn page_line_segments(&self, page: usize) -> Result<Vec<LineSegment>, AccessError> {
        self.layout(page).map(|layout| layout.lines.clone())
    }

    fn page_has_actions(&self, page: usize) -> Result<bool, AccessError> {
        page.checked_sub(1)
            .and_then(|i| self.page_actions.get(i).copied())
            .ok_or_else(|| AccessError::Extraction(format!("page {page} out of range")))
    }

    fn document_has_actions(&self) -> Result<bool, AccessError> {
        Ok(self.document_actions)
    }

    fn embedded_file_count(&self) -> Result<usize, AccessError> {
        Ok(self.embedded_files)
    }

    fn digital_signatures(&self) -> Option<Vec<DigitalSignature>> {
        Some(self.signatures.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Dictionary, Stream};
    use pretty_assertions::assert_eq;
    use shared_types::WidgetKind;

    /// One-page PDF with a labelled SSN field and a signed signature field
    fn create_form_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal("Social Security Number")]),
                Operation::new("ET", vec![]),
                Operation::new("m", vec![72.into(), 600.into()]),
                Operation::new("l", vec![300.into(), 600.into()]),
                Operation::new("S", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let sig_value_id = doc.add_object(dictionary! {
            "Type" => "Sig",
            "Filter" => "Adobe.PPKLite",
            "SubFilter" => "ETSI.RFC3161",
        });
        let ssn_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal("ssn"),
            "TU" => Object::string_literal("Owner SSN"),
            "Ff" => 2,
            "Rect" => vec![72.into(), 660.into(), 272.into(), 680.into()],
            "AA" => Dictionary::new(),
        });
        let sig_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Sig",
            "T" => Object::string_literal("owner_sig"),
            "V" => Object::Reference(sig_value_id),
            "Rect" => vec![72.into(), 580.into(), 272.into(), 600.into()],
        });

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    "F1" => dictionary! {
                        "Type" => "Font",
                        "Subtype" => "Type1",
                        "BaseFont" => "Helvetica",
                    },
                },
            },
            "Annots" => vec![Object::Reference(ssn_id), Object::Reference(sig_id)],
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let acroform_id = doc.add_object(dictionary! {
            "Fields" => vec![Object::Reference(ssn_id), Object::Reference(sig_id)],
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
            "AcroForm" => Object::Reference(acroform_id),
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Account Application"),
            "Producer" => Object::string_literal("LiveCycle Designer"),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.trailer.set("Info", Object::Reference(info_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_widgets_are_enumerated_with_flags() {
        let pdf = create_form_pdf();
        let document = PdfFormDocument::from_bytes(&pdf, "forms/app.pdf").unwrap();
        let widgets = document.widgets().unwrap();
        assert_eq!(widgets.len(), 2);

        let ssn = &widgets[0];
        assert_eq!(ssn.name, "ssn");
        assert_eq!(ssn.tooltip, "Owner SSN");
        assert_eq!(ssn.kind, WidgetKind::Text);
        assert!(ssn.is_required);
        assert!(ssn.actions_present);
        assert_eq!(ssn.page_index, 1);
        assert_eq!(ssn.bounding_box.y0, 112.0);
        assert_eq!(ssn.bounding_box.y1, 132.0);

        let sig = &widgets[1];
        assert_eq!(sig.kind, WidgetKind::Signature);
        assert!(!sig.is_required);
        assert!(!sig.actions_present);
    }

    #[test]
    fn test_signed_field_reports_timestamp() {
        let pdf = create_form_pdf();
        let document = PdfFormDocument::from_bytes(&pdf, "forms/app.pdf").unwrap();
        assert_eq!(
            document.digital_signatures(),
            Some(vec![DigitalSignature {
                timestamp_present: true
            }])
        );
    }

    #[test]
    fn test_metadata_keys_are_lowercased() {
        let pdf = create_form_pdf();
        let document = PdfFormDocument::from_bytes(&pdf, "forms/app.pdf").unwrap();
        let metadata = document.metadata().unwrap();
        assert_eq!(metadata.get("title").map(String::as_str), Some("Account Application"));
        assert_eq!(metadata.get("producer").map(String::as_str), Some("LiveCycle Designer"));
    }

    #[test]
    fn test_layout_facts() {
        let pdf = create_form_pdf();
        let document = PdfFormDocument::from_bytes(&pdf, "forms/app.pdf").unwrap();
        assert_eq!(document.page_count().unwrap(), 1);

        let blocks = document.page_text_blocks(1).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Social Security Number");

        let lines = document.page_line_segments(1).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(document.page_graphics(1).unwrap().vector_drawing_ops, 1);
        assert!(document.page_text_blocks(2).is_err());
    }

    #[test]
    fn test_actions_and_attachments_absent() {
        let pdf = create_form_pdf();
        let document = PdfFormDocument::from_bytes(&pdf, "forms/app.pdf").unwrap();
        assert!(!document.document_has_actions().unwrap());
        assert!(!document.page_has_actions(1).unwrap());
        assert_eq!(document.embedded_file_count().unwrap(), 0);
    }

    #[test]
    fn test_garbage_bytes_fail_to_parse() {
        let result = PdfFormDocument::from_bytes(b"not a pdf at all", "junk.pdf");
        assert!(matches!(result, Err(DecodeError::ParseError(_))));
    }
}

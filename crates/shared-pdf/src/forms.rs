//! AcroForm widget enumeration
//!
//! Widgets are visited page by page in `/Annots` order. Field attributes
//! (`/T`, `/TU`, `/FT`, `/Ff`) are inherited through the `/Parent` chain.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};
use shared_types::{BoundingBox, DigitalSignature, WidgetInfo, WidgetKind};

use crate::content::page_media_box;
use crate::objects::{self, MAX_DEPTH};

const FLAG_REQUIRED: i64 = 1 << 1;
const FLAG_RADIO: i64 = 1 << 15;
const FLAG_PUSH_BUTTON: i64 = 1 << 16;
const FLAG_COMBO: i64 = 1 << 17;

/// Widget plus the signature value, if it is a signed signature field
pub(crate) struct EnumeratedWidget {
    pub info: WidgetInfo,
    pub signature: Option<DigitalSignature>,
}

/// Inherited attributes collected from a widget and its ancestors
#[derive(Default)]
struct FieldAttributes {
    name_parts: Vec<String>,
    tooltip: Option<String>,
    field_type: Option<Vec<u8>>,
    flags: Option<i64>,
    has_actions: bool,
    value: Option<Dictionary>,
}

fn collect_attributes(doc: &Document, widget: &Dictionary) -> FieldAttributes {
    let mut attrs = FieldAttributes::default();
    let mut node = Some(widget);
    for _ in 0..MAX_DEPTH {
        let Some(dict) = node else { break };
        if let Some(part) = objects::get_text(doc, dict, b"T") {
            attrs.name_parts.push(part);
        }
        if attrs.tooltip.is_none() {
            attrs.tooltip = objects::get_text(doc, dict, b"TU");
        }
        if attrs.field_type.is_none() {
            attrs.field_type = objects::get_name(doc, dict, b"FT").map(<[u8]>::to_vec);
        }
        if attrs.flags.is_none() {
            attrs.flags = objects::get_int(doc, dict, b"Ff");
        }
        if attrs.value.is_none() {
            attrs.value = objects::get_dict(doc, dict, b"V").cloned();
        }
        if dict.has(b"A") || dict.has(b"AA") {
            attrs.has_actions = true;
        }
        node = objects::get_dict(doc, dict, b"Parent");
    }
    attrs
}

fn widget_kind(field_type: Option<&[u8]>, flags: i64) -> WidgetKind {
    match field_type {
        Some(b"Tx") => WidgetKind::Text,
        Some(b"Sig") => WidgetKind::Signature,
        Some(b"Btn") if flags & FLAG_PUSH_BUTTON != 0 => WidgetKind::PushButton,
        Some(b"Btn") if flags & FLAG_RADIO != 0 => WidgetKind::Radio,
        Some(b"Btn") => WidgetKind::Checkbox,
        Some(b"Ch") if flags & FLAG_COMBO != 0 => WidgetKind::ComboBox,
        Some(b"Ch") => WidgetKind::ListBox,
        _ => WidgetKind::Unknown,
    }
}

fn signature_value(doc: &Document, value: &Dictionary) -> DigitalSignature {
    let rfc3161 = objects::get_name(doc, value, b"SubFilter") == Some(b"ETSI.RFC3161".as_slice());
    DigitalSignature {
        timestamp_present: rfc3161 || value.has(b"TimeStamp"),
    }
}

fn is_widget(doc: &Document, annot: &Dictionary) -> bool {
    objects::get_name(doc, annot, b"Subtype") == Some(b"Widget".as_slice())
}

/// Every widget annotation in page order
pub(crate) fn enumerate_widgets(
    doc: &Document,
    pages: &BTreeMap<u32, ObjectId>,
) -> Vec<EnumeratedWidget> {
    let mut widgets = Vec::new();
    for (&page_num, &page_id) in pages {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        let Some(annots) = objects::get_array(doc, page, b"Annots") else {
            continue;
        };
        let media = page_media_box(doc, page);
        for annot in annots {
            let Some(Object::Dictionary(dict)) = objects::resolve(doc, annot) else {
                continue;
            };
            if !is_widget(doc, dict) {
                continue;
            }
            let attrs = collect_attributes(doc, dict);
            let flags = attrs.flags.unwrap_or(0);
            let kind = widget_kind(attrs.field_type.as_deref(), flags);

            let bounding_box = dict
                .get(b"Rect")
                .ok()
                .and_then(|obj| objects::rect(doc, obj))
                .map(|[x0, y0, x1, y1]| {
                    BoundingBox::new(x0 - media[0], media[3] - y0, x1 - media[0], media[3] - y1)
                })
                .unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0));

            let mut name_parts = attrs.name_parts;
            name_parts.reverse();
            let signature = match (kind, attrs.value.as_ref()) {
                (WidgetKind::Signature, Some(value)) => Some(signature_value(doc, value)),
                _ => None,
            };

            widgets.push(EnumeratedWidget {
                info: WidgetInfo {
                    name: name_parts.join(".").trim().to_string(),
                    tooltip: attrs.tooltip.unwrap_or_default().trim().to_string(),
                    is_required: flags & FLAG_REQUIRED != 0,
                    kind,
                    bounding_box,
                    page_index: page_num as usize,
                    actions_present: attrs.has_actions,
                },
                signature,
            });
        }
    }
    widgets
}

/// Count leaves of a name tree
pub(crate) fn name_tree_len(doc: &Document, node: &Dictionary, depth: usize) -> usize {
    if depth > MAX_DEPTH {
        return 0;
    }
    let mut count = objects::get_array(doc, node, b"Names")
        .map(|names| names.len() / 2)
        .unwrap_or(0);
    if let Some(kids) = objects::get_array(doc, node, b"Kids") {
        for kid in kids {
            if let Some(Object::Dictionary(child)) = objects::resolve(doc, kid) {
                count += name_tree_len(doc, child, depth + 1);
            }
        }
    }
    count
}
